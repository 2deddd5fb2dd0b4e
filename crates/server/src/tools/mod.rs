//! MCP tool implementations.
//!
//! This module contains all tools exposed by the scanvault server.

pub mod cache;
pub mod feed;
pub mod ledger;

use rmcp::{
    ErrorData as McpError,
    model::{CallToolResult, Content},
};
use scanvault_core::Error;
use serde::Serialize;

/// Wrap a tool output as pretty-printed JSON text content.
pub(crate) fn json_result<T: Serialize>(output: &T) -> Result<CallToolResult, McpError> {
    let json = serde_json::to_string_pretty(output).map_err(Error::Serialization)?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

/// Map a failed blocking task onto the ledger I/O error.
pub(crate) fn join_error(err: tokio::task::JoinError) -> Error {
    Error::Io(std::io::Error::other(format!("ledger task failed: {err}")))
}
