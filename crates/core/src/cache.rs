//! In-memory TTL cache for computed results.
//!
//! Entries carry an absolute deadline fixed at write time and are expired
//! lazily on read. When the table grows past its ceiling the oldest-inserted
//! entry is evicted, whatever its remaining TTL or how recently it was read.
//! This is insertion-order eviction, not LRU.

use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

use serde_json::Value;

use crate::Record;
use crate::hash::stable_digest;

/// Default time-to-live of a cache entry.
pub const DEFAULT_TTL: Duration = Duration::from_secs(10 * 60);

/// Default ceiling on the number of entries.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// Request parameters that never contribute to a cache key.
pub const CACHE_VOLATILE_FIELDS: &[&str] = &[
    "requestId",
    "request_id",
    "correlationId",
    "correlation_id",
    "runId",
    "run_id",
    "ts",
    "timestamp",
    "_t",
    "nocache",
    "noCache",
    "cacheBust",
    "cache_bust",
];

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    data: V,
    expires_at: Instant,
    seq: u64,
}

/// TTL cache keyed by normalized request hashes.
#[derive(Debug)]
pub struct ResultCache<V = Value> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Insertion sequence -> key, oldest first.
    order: BTreeMap<u64, String>,
    next_seq: u64,
    ttl: Duration,
    max_entries: usize,
}

impl<V: Clone> Default for ResultCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

/// Compute the cache key for a set of request parameters.
///
/// Uses the same canonical form as ledger ids with request-specific volatile
/// fields removed, and keeps the full SHA-256 digest.
pub fn compute_key(params: &Record) -> String {
    stable_digest(params, CACHE_VOLATILE_FIELDS)
}

impl<V: Clone> ResultCache<V> {
    /// Create a cache with the default 10 minute TTL and 1000 entry ceiling.
    pub fn new() -> Self {
        Self::with_limits(DEFAULT_TTL, DEFAULT_MAX_ENTRIES)
    }

    pub fn with_limits(ttl: Duration, max_entries: usize) -> Self {
        Self { entries: HashMap::new(), order: BTreeMap::new(), next_seq: 0, ttl, max_entries }
    }

    /// Look up a live entry.
    ///
    /// An entry past its deadline is removed and reported as a miss.
    pub fn get(&mut self, key: &str) -> Option<V> {
        let expired = self.entries.get(key)?.expires_at <= Instant::now();
        if expired {
            self.remove(key);
            tracing::debug!(key, "Cache entry expired");
            return None;
        }
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    /// Store `data` under `key` with a fresh deadline.
    ///
    /// Overwriting a key keeps its original insertion position. If the table
    /// then exceeds its ceiling, the oldest-inserted entry is evicted.
    pub fn set(&mut self, key: impl Into<String>, data: V) {
        let key = key.into();
        let expires_at = Instant::now() + self.ttl;

        if let Some(entry) = self.entries.get_mut(&key) {
            entry.data = data;
            entry.expires_at = expires_at;
            return;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert(seq, key.clone());
        self.entries.insert(key, CacheEntry { data, expires_at, seq });

        if self.entries.len() > self.max_entries {
            if let Some((_, oldest)) = self.order.pop_first() {
                self.entries.remove(&oldest);
                tracing::debug!(key = %oldest, "Evicted oldest cache entry");
            }
        }
    }

    /// Return the cached value for `key`, computing and storing it on a miss.
    ///
    /// # Errors
    ///
    /// Propagates any error from `compute`; nothing is cached in that case.
    pub fn get_or_try_insert_with<E>(&mut self, key: &str, compute: impl FnOnce() -> Result<V, E>) -> Result<V, E> {
        if let Some(hit) = self.get(key) {
            tracing::debug!(key, "Cache hit");
            return Ok(hit);
        }
        let data = compute()?;
        self.set(key, data.clone());
        Ok(data)
    }

    /// Remove every entry, returning how many were held.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.order.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn remove(&mut self, key: &str) {
        if let Some(entry) = self.entries.remove(key) {
            self.order.remove(&entry.seq);
        }
    }
}
