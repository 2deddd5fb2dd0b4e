//! Core persistence and caching for scanvault.
//!
//! This crate provides:
//! - Content-addressed record ids
//! - An append-only JSONL ledger
//! - A deduplicating in-memory store with cursor pagination
//! - A TTL result cache with insertion-order eviction
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod hash;
pub mod ledger;
pub mod limit;
pub mod store;

pub use cache::{ResultCache, compute_key};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use hash::derive_id;
pub use ledger::{Ledger, LedgerPage, LedgerQuery};
pub use limit::Limit;
pub use store::{DedupStore, ListPage, ListParams, UpsertOutcome};

/// A record is an arbitrary JSON object.
pub type Record = serde_json::Map<String, serde_json::Value>;
