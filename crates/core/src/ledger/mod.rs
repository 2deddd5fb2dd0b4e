//! Append-only ledger of content-addressed records.
//!
//! The ledger is a newline-delimited JSON log. Each appended record is tagged
//! with a deterministic id, the run that produced it, a write timestamp, and
//! a source. Records are never rewritten once appended.
//!
//! - Appends are batched into a single write per call
//! - Reads tolerate corrupt lines by skipping them
//! - There is no cross-process locking; one owning process is assumed

pub mod query;

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{SecondsFormat, Utc};
use serde_json::Value;

use crate::hash::derive_id;
use crate::{Error, Record};

pub use query::{LedgerPage, LedgerQuery};

/// Default on-disk location of the ledger, relative to the working directory.
pub const DEFAULT_LEDGER_PATH: &str = "data/ledger/opportunities.jsonl";

/// Source stamped on records that arrive without one.
pub const DEFAULT_SOURCE: &str = "scan";

/// Handle to an append-only ledger file.
///
/// Cloning is cheap; clones refer to the same file.
#[derive(Clone, Debug)]
pub struct Ledger {
    path: PathBuf,
    default_source: String,
}

impl Ledger {
    /// Create a handle for the ledger at `path`.
    ///
    /// Nothing is touched on disk until the first append.
    pub fn open(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), default_source: DEFAULT_SOURCE.to_string() }
    }

    /// Override the source stamped on records that lack one.
    pub fn with_default_source(mut self, source: impl Into<String>) -> Self {
        self.default_source = source.into();
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a batch of records produced by `run_id`.
    ///
    /// Returns the number of records written. An empty `run_id` or an empty
    /// batch is a no-op returning 0 without touching the file. The parent
    /// directory is created on first use.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if the directory or file cannot be created or
    /// written, and `Error::Serialization` if a record cannot be encoded.
    pub fn append(&self, run_id: &str, records: &[Record]) -> Result<usize, Error> {
        if run_id.is_empty() || records.is_empty() {
            tracing::debug!(run_id, count = records.len(), "Skipping empty ledger append");
            return Ok(0);
        }

        let ts = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
        let mut batch = String::new();
        for record in records {
            let line = serde_json::to_string(&self.stamp(record, run_id, &ts))?;
            batch.push_str(&line);
            batch.push('\n');
        }

        if let Some(dir) = self.path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(batch.as_bytes())?;
        file.flush()?;

        tracing::debug!(run_id, count = records.len(), path = %self.path.display(), "Appended ledger records");
        Ok(records.len())
    }

    /// Enrich a record with its derived id, run, timestamp, and source.
    ///
    /// The id is derived from the record as supplied, before any field is
    /// added, so a defaulted source never changes it.
    fn stamp(&self, record: &Record, run_id: &str, ts: &str) -> Record {
        let id = derive_id(record);
        let mut stamped = record.clone();
        stamped.insert("id".into(), Value::String(id.clone()));
        stamped.insert("opportunity_id".into(), Value::String(id));
        stamped.insert("run_id".into(), Value::String(run_id.to_string()));
        stamped.insert("ts".into(), Value::String(ts.to_string()));
        if !stamped.contains_key("source") {
            stamped.insert("source".into(), Value::String(self.default_source.clone()));
        }
        stamped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            _ => panic!("test records must be objects"),
        }
    }

    fn read_lines(path: &Path) -> Vec<Record> {
        fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[test]
    fn test_append_creates_directory() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("nested/ledger/log.jsonl"));

        let count = ledger.append("run1", &[record(json!({"symbol": "BTC"}))]).unwrap();
        assert_eq!(count, 1);
        assert!(ledger.path().exists());
    }

    #[test]
    fn test_append_empty_run_id_is_noop() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl"));

        let count = ledger.append("", &[record(json!({"symbol": "BTC"}))]).unwrap();
        assert_eq!(count, 0);
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_append_empty_batch_is_noop() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl"));

        assert_eq!(ledger.append("run1", &[]).unwrap(), 0);
        assert!(!ledger.path().exists());
    }

    #[test]
    fn test_append_stamps_fields() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl"));

        ledger.append("run1", &[record(json!({"symbol": "BTC", "score": 5}))]).unwrap();

        let lines = read_lines(ledger.path());
        assert_eq!(lines.len(), 1);
        let line = &lines[0];
        assert_eq!(line["id"], json!("ecf58cdf52ee63a5"));
        assert_eq!(line["opportunity_id"], line["id"]);
        assert_eq!(line["run_id"], json!("run1"));
        assert_eq!(line["source"], json!("scan"));
        let ts = line["ts"].as_str().unwrap();
        assert!(ts.ends_with('Z'));
        assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
    }

    #[test]
    fn test_append_keeps_existing_source() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl")).with_default_source("news");

        ledger
            .append("run1", &[record(json!({"headline": "a", "source": "wire"})), record(json!({"headline": "b"}))])
            .unwrap();

        let lines = read_lines(ledger.path());
        assert_eq!(lines[0]["source"], json!("wire"));
        assert_eq!(lines[1]["source"], json!("news"));
    }

    #[test]
    fn test_append_is_append_only() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl"));

        ledger.append("run1", &[record(json!({"n": 1})), record(json!({"n": 2}))]).unwrap();
        ledger.append("run2", &[record(json!({"n": 1}))]).unwrap();

        let lines = read_lines(ledger.path());
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0]["id"], lines[2]["id"]);
        assert_eq!(lines[2]["run_id"], json!("run2"));
    }

    #[test]
    fn test_reappend_same_content_same_id() {
        let dir = TempDir::new().unwrap();
        let ledger = Ledger::open(dir.path().join("log.jsonl"));

        ledger.append("run1", &[record(json!({"symbol": "ETH", "rank": 1}))]).unwrap();
        ledger.append("run2", &[record(json!({"rank": 9, "symbol": "ETH"}))]).unwrap();

        let lines = read_lines(ledger.path());
        assert_eq!(lines[0]["id"], lines[1]["id"]);
    }
}
