//! Shared state handed to every tool call.

use std::sync::Arc;

use scanvault_core::{AppConfig, DedupStore, Ledger, LedgerPage, ResultCache};
use tokio::sync::Mutex;

/// Owned instances of the ledger, feed store, and query cache.
///
/// Cloning shares the same underlying store and cache.
#[derive(Clone)]
pub struct AppState {
    pub ledger: Ledger,
    pub feed: Arc<Mutex<DedupStore>>,
    pub query_cache: Arc<Mutex<ResultCache<LedgerPage>>>,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            ledger: config.ledger(),
            feed: Arc::new(Mutex::new(DedupStore::new())),
            query_cache: Arc::new(Mutex::new(config.result_cache())),
        }
    }
}
