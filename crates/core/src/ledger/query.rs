//! Ledger queries.
//!
//! Queries scan the log from the start, filter, and return the first matches
//! in file order. There is no real cursor: `next_cursor` is always `None`.

use std::fs::File;
use std::io::{self, BufRead, BufReader};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::Ledger;
use crate::limit::{Limit, resolve_ledger_limit};
use crate::{Error, Record};

/// Filters for a ledger query.
///
/// `since_ts` is a plain string lower bound on `ts`, so it only works with
/// fixed-width ISO timestamps like the ones the ledger writes.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerQuery {
    /// Only records appended by this run.
    #[serde(default)]
    pub run_id: Option<String>,

    /// Only records with `ts >= since_ts` (string comparison).
    #[serde(default)]
    pub since_ts: Option<String>,

    /// Only records from this source.
    #[serde(default)]
    pub source: Option<String>,

    /// Page size (default 20, at most 50). Zero, negative, and non-numeric
    /// values are rejected like values above 50.
    #[serde(default)]
    pub limit: Option<Limit>,
}

impl LedgerQuery {
    fn matches(&self, record: &Record) -> bool {
        let run_ok = self.run_id.as_deref().is_none_or(|run_id| field_str(record, "run_id") == Some(run_id));
        let since_ok = self
            .since_ts
            .as_deref()
            .is_none_or(|since_ts| field_str(record, "ts").is_some_and(|ts| ts >= since_ts));
        let source_ok = self.source.as_deref().is_none_or(|source| field_str(record, "source") == Some(source));
        run_ok && since_ok && source_ok
    }
}

fn field_str<'a>(record: &'a Record, field: &str) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}

/// One page of ledger results.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct LedgerPage {
    /// Matching records in file order, at most `limit` of them.
    pub items: Vec<Record>,
    /// Number of matching records before the limit was applied.
    pub total_estimate: usize,
    /// Always `None`; forward pagination is not supported.
    pub next_cursor: Option<String>,
}

impl Ledger {
    /// Query the ledger.
    ///
    /// A missing log yields an empty page. Lines that fail to parse are
    /// skipped.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidInput` if the limit is malformed or above 50;
    /// this is checked before the log is opened. Returns `Error::Io` if the
    /// log exists but cannot be read.
    pub fn query(&self, query: &LedgerQuery) -> Result<LedgerPage, Error> {
        let limit = resolve_ledger_limit(query.limit.as_ref())?;

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "Ledger not found, returning empty page");
                return Ok(LedgerPage::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut page = LedgerPage::default();
        let mut skipped = 0usize;
        for (index, line) in BufReader::new(file).split(b'\n').enumerate() {
            let line = line?;
            if line.iter().all(u8::is_ascii_whitespace) {
                continue;
            }
            let record: Record = match serde_json::from_slice(&line) {
                Ok(record) => record,
                Err(e) => {
                    skipped += 1;
                    tracing::warn!(line = index + 1, error = %e, "Skipping corrupt ledger line");
                    continue;
                }
            };
            if !query.matches(&record) {
                continue;
            }
            page.total_estimate += 1;
            if page.items.len() < limit {
                page.items.push(record);
            }
        }

        tracing::debug!(
            returned = page.items.len(),
            total_estimate = page.total_estimate,
            skipped,
            limit,
            "Ledger query complete"
        );
        Ok(page)
    }
}
