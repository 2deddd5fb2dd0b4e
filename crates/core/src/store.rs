//! In-memory deduplicating item store with cursor pagination.
//!
//! Items are keyed by their string `id` and kept sorted by id, newest
//! (lexicographically greatest) first. The first copy of an id wins; later
//! duplicates are counted and dropped.
//!
//! Ids are compared as strings, so cursors only behave when ids are
//! fixed-width (e.g. zero-padded numbers or ISO timestamps). The store does
//! not check this.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::Record;
use crate::limit::{Limit, resolve_store_limit};

/// Outcome of [`DedupStore::upsert_many`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct UpsertOutcome {
    /// Items added to the store.
    pub inserted: usize,
    /// Items discarded because their id was already present.
    pub deduped: usize,
    /// Items discarded because they had no non-empty string `id`.
    pub skipped: usize,
}

/// Cursor parameters for [`DedupStore::list`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Only return items with an id strictly greater than this.
    #[serde(default)]
    pub since_id: Option<String>,

    /// Page size, clamped to 1..=50 (default 50).
    #[serde(default)]
    pub limit: Option<Limit>,
}

/// One page of store items.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPage {
    pub items: Vec<Record>,
    pub count: usize,
    pub limit: usize,
    pub since_id: Option<String>,
    /// Greatest id returned, or the request's `since_id` when nothing was.
    pub next_since_id: Option<String>,
}

/// Deduplicating store of items with unique string ids.
#[derive(Debug, Default)]
pub struct DedupStore {
    items: Vec<Record>,
    ids: HashSet<String>,
}

fn item_id(item: &Record) -> Option<&str> {
    item.get("id").and_then(Value::as_str).filter(|id| !id.is_empty())
}

impl DedupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a batch of items into the store.
    ///
    /// Items without a string `id` are skipped with a warning. Items whose id
    /// is already held (including earlier in the same batch) are counted as
    /// deduped. The collection is re-sorted only when something was inserted.
    pub fn upsert_many(&mut self, items: impl IntoIterator<Item = Record>) -> UpsertOutcome {
        let mut outcome = UpsertOutcome::default();

        for item in items {
            let Some(id) = item_id(&item) else {
                outcome.skipped += 1;
                tracing::warn!(keys = ?item.keys().collect::<Vec<_>>(), "Skipping store item without an id");
                continue;
            };
            if self.ids.contains(id) {
                outcome.deduped += 1;
                continue;
            }
            self.ids.insert(id.to_string());
            self.items.push(item);
            outcome.inserted += 1;
        }

        if outcome.inserted > 0 {
            self.items.sort_by(|a, b| item_id(b).cmp(&item_id(a)));
        }

        tracing::debug!(
            inserted = outcome.inserted,
            deduped = outcome.deduped,
            skipped = outcome.skipped,
            total = self.items.len(),
            "Upserted store items"
        );
        outcome
    }

    /// List the newest items, optionally only those newer than `since_id`.
    ///
    /// `next_since_id` passes `since_id` through unchanged when the page is
    /// empty, so "nothing newer" and "no data" look the same to callers.
    pub fn list(&self, params: &ListParams) -> ListPage {
        let limit = resolve_store_limit(params.limit.as_ref());
        let since_id = params.since_id.as_deref();

        let items: Vec<Record> = self
            .items
            .iter()
            .filter(|item| match (since_id, item_id(item)) {
                (Some(since), Some(id)) => id > since,
                _ => true,
            })
            .take(limit)
            .cloned()
            .collect();

        let next_since_id = items
            .first()
            .and_then(item_id)
            .map(str::to_string)
            .or_else(|| params.since_id.clone());

        ListPage { count: items.len(), items, limit, since_id: params.since_id.clone(), next_since_id }
    }

    /// Number of items currently held.
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drop every item.
    pub fn clear(&mut self) {
        self.items.clear();
        self.ids.clear();
    }
}
