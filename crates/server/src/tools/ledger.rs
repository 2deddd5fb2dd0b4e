//! ledger_append and ledger_query tool implementations.
//!
//! File I/O runs on the blocking pool. Query pages are cached by a key
//! derived from the query parameters; any append that writes records clears
//! that cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use scanvault_core::limit::resolve_ledger_limit;
use scanvault_core::{Error, LedgerQuery, Limit, Record, compute_key};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{join_error, json_result};
use crate::state::AppState;

/// Parameters for the ledger_append tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerAppendParams {
    /// Run that produced the records. A missing or empty run id appends nothing.
    #[serde(default)]
    pub run_id: Option<String>,

    /// Records to append. Anything other than an array appends nothing.
    #[serde(default)]
    pub records: Value,
}

/// Output from the ledger_append tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct LedgerAppendOutput {
    /// Number of records written.
    pub appended: usize,
}

fn records_from(value: Value) -> Vec<Record> {
    let Value::Array(values) = value else {
        tracing::debug!("ledger_append records is not an array");
        return Vec::new();
    };

    values
        .into_iter()
        .filter_map(|value| match value {
            Value::Object(record) => Some(record),
            other => {
                tracing::warn!(value = %other, "Skipping non-object ledger record");
                None
            }
        })
        .collect()
}

/// Implementation of the ledger_append tool.
pub async fn append_impl(state: &AppState, params: LedgerAppendParams) -> Result<CallToolResult, McpError> {
    let records = records_from(params.records);
    let run_id = params.run_id.unwrap_or_default();
    let state = state.clone();

    let appended = tokio::task::spawn_blocking(move || -> Result<usize, Error> {
        let appended = state.ledger.append(&run_id, &records)?;
        if appended > 0 {
            let cleared = state.query_cache.blocking_lock().clear();
            tracing::debug!(cleared, "Cleared ledger query cache after append");
        }
        Ok(appended)
    })
    .await
    .map_err(join_error)??;

    json_result(&LedgerAppendOutput { appended })
}

/// Implementation of the ledger_query tool.
pub async fn query_impl(state: &AppState, mut params: LedgerQuery) -> Result<CallToolResult, McpError> {
    // Equivalent limits ("20", 20, absent) share one cache entry.
    let limit = resolve_ledger_limit(params.limit.as_ref())?;
    params.limit = Some(Limit::from(limit as i64));

    // Nest the query so its runId filter is part of the key rather than
    // dropped as a volatile correlation field.
    let mut key_params = Record::new();
    key_params.insert("tool".into(), Value::from("ledger_query"));
    key_params.insert("query".into(), serde_json::to_value(&params).map_err(Error::Serialization)?);
    let key = compute_key(&key_params);
    let state = state.clone();

    let page = tokio::task::spawn_blocking(move || {
        let mut cache = state.query_cache.blocking_lock();
        cache.get_or_try_insert_with(&key, || state.ledger.query(&params))
    })
    .await
    .map_err(join_error)??;

    json_result(&page)
}
