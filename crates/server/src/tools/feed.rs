//! feed_upsert and feed_list tool implementations.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use scanvault_core::{ListParams, UpsertOutcome};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::json_result;
use crate::state::AppState;

/// Parameters for the feed_upsert tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FeedUpsertParams {
    /// Items to merge. Each needs a string `id`; non-objects are skipped.
    pub items: Vec<Value>,
}

/// Implementation of the feed_upsert tool.
pub async fn upsert_impl(state: &AppState, params: FeedUpsertParams) -> Result<CallToolResult, McpError> {
    let total = params.items.len();
    let items: Vec<_> = params
        .items
        .into_iter()
        .filter_map(|item| match item {
            Value::Object(record) => Some(record),
            _ => None,
        })
        .collect();
    let non_objects = total - items.len();

    let mut outcome: UpsertOutcome = state.feed.lock().await.upsert_many(items);
    outcome.skipped += non_objects;

    json_result(&outcome)
}

/// Implementation of the feed_list tool.
pub async fn list_impl(state: &AppState, params: ListParams) -> Result<CallToolResult, McpError> {
    let page = state.feed.lock().await.list(&params);
    json_result(&page)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::test_support::{output, state_in};
    use scanvault_core::{Limit, ListPage};
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_upsert_counts() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let params = FeedUpsertParams { items: vec![json!({"id": "0005"}), json!({"id": "0003"}), json!({"id": "0005"})] };
        let outcome: UpsertOutcome = output(&upsert_impl(&state, params).await.unwrap());
        assert_eq!(outcome, UpsertOutcome { inserted: 2, deduped: 1, skipped: 0 });
        assert_eq!(state.feed.lock().await.count(), 2);
    }

    #[tokio::test]
    async fn test_upsert_skips_invalid_items() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let params = FeedUpsertParams { items: vec![json!("0001"), json!({"title": "no id"}), json!({"id": "0001"})] };
        let outcome: UpsertOutcome = output(&upsert_impl(&state, params).await.unwrap());
        assert_eq!(outcome, UpsertOutcome { inserted: 1, deduped: 0, skipped: 2 });
    }

    #[tokio::test]
    async fn test_list_pages_forward() {
        let dir = TempDir::new().unwrap();
        let state = state_in(&dir);

        let params = FeedUpsertParams { items: vec![json!({"id": "0001"}), json!({"id": "0003"})] };
        upsert_impl(&state, params).await.unwrap();

        let page: ListPage = output(&list_impl(&state, ListParams::default()).await.unwrap());
        assert_eq!(page.count, 2);
        assert_eq!(page.next_since_id.as_deref(), Some("0003"));

        let params = FeedUpsertParams { items: vec![json!({"id": "0004"})] };
        upsert_impl(&state, params).await.unwrap();

        let next = ListParams { since_id: page.next_since_id.clone(), limit: Some(Limit::from("10")) };
        let page: ListPage = output(&list_impl(&state, next).await.unwrap());
        assert_eq!(page.count, 1);
        assert_eq!(page.items[0]["id"], json!("0004"));
        assert_eq!(page.limit, 10);

        let idle = ListParams { since_id: Some("0004".into()), limit: None };
        let page: ListPage = output(&list_impl(&state, idle).await.unwrap());
        assert!(page.items.is_empty());
        assert_eq!(page.next_since_id.as_deref(), Some("0004"));
    }
}
