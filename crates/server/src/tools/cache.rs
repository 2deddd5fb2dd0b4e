//! cache_clear tool implementation.
//!
//! Drops every cached ledger query page.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Output from the cache_clear tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheClearOutput {
    /// Number of entries removed.
    pub cleared: usize,
}

/// Implementation of the cache_clear tool.
pub async fn clear_impl(state: &AppState) -> Result<CallToolResult, McpError> {
    let cleared = state.query_cache.lock().await.clear();
    tracing::info!(cleared, "Cleared ledger query cache");
    json_result(&CacheClearOutput { cleared })
}
