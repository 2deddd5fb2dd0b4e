//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the appropriate implementations.
use crate::state::AppState;
use crate::tools::{
    cache::clear_impl,
    feed::{FeedUpsertParams, list_impl, upsert_impl},
    ledger::{LedgerAppendParams, append_impl, query_impl},
};

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use scanvault_core::{LedgerQuery, ListParams};

/// The main MCP server handler for scanvault.
#[derive(Clone)]
pub struct ScanVaultServer {
    tool_router: ToolRouter<Self>,
    state: AppState,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl ScanVaultServer {
    /// Create a new server handler around the given state.
    pub fn new(state: AppState) -> Self {
        Self { tool_router: Self::tool_router(), state }
    }

    #[tool(description = "Append records produced by a run to the ledger. Returns the number of records written.")]
    async fn ledger_append(&self, params: Parameters<LedgerAppendParams>) -> Result<CallToolResult, McpError> {
        append_impl(&self.state, params.0).await
    }

    #[tool(
        description = "Query ledger records by runId, sinceTs (string lower bound on ts), and source. limit defaults to 20; values above 50 are rejected."
    )]
    async fn ledger_query(&self, params: Parameters<LedgerQuery>) -> Result<CallToolResult, McpError> {
        query_impl(&self.state, params.0).await
    }

    #[tool(description = "Merge items with unique string ids into the feed store. Existing ids win over duplicates.")]
    async fn feed_upsert(&self, params: Parameters<FeedUpsertParams>) -> Result<CallToolResult, McpError> {
        upsert_impl(&self.state, params.0).await
    }

    #[tool(
        description = "List the newest feed items, optionally only ids greater than sinceId. limit is clamped to 1-50."
    )]
    async fn feed_list(&self, params: Parameters<ListParams>) -> Result<CallToolResult, McpError> {
        list_impl(&self.state, params.0).await
    }

    #[tool(description = "Clear the ledger query cache.")]
    async fn cache_clear(&self) -> Result<CallToolResult, McpError> {
        clear_impl(&self.state).await
    }
}

impl ServerHandler for ScanVaultServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "scanvault".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}
