//! Page-size arguments shared by the ledger and the dedup store.
//!
//! Callers may send a limit as a JSON number or as a numeric-looking string.
//! The ledger rejects anything out of range; the store clamps.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::Error;

/// Largest page either the ledger or the store will return.
pub const MAX_LIMIT: i64 = 50;

/// Ledger page size when the caller sends none.
pub const DEFAULT_LEDGER_LIMIT: usize = 20;

/// Store page size when the caller sends none, or an unusable value.
pub const DEFAULT_STORE_LIMIT: usize = 50;

/// A caller-supplied page size before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum Limit {
    Number(f64),
    Text(String),
}

impl Limit {
    /// Integer value of the limit, if it looks numeric.
    ///
    /// Fractional values are truncated toward zero.
    pub fn parse(&self) -> Option<i64> {
        match self {
            Limit::Number(n) => truncate(*n),
            Limit::Text(s) => {
                let s = s.trim();
                s.parse::<i64>().ok().or_else(|| s.parse::<f64>().ok().and_then(truncate))
            }
        }
    }
}

fn truncate(n: f64) -> Option<i64> {
    if n.is_finite() { Some(n.trunc() as i64) } else { None }
}

impl From<i64> for Limit {
    fn from(n: i64) -> Self {
        Limit::Number(n as f64)
    }
}

impl From<&str> for Limit {
    fn from(s: &str) -> Self {
        Limit::Text(s.to_string())
    }
}

/// Resolve a ledger query limit.
///
/// # Errors
///
/// Returns `Error::InvalidInput` if the limit exceeds [`MAX_LIMIT`], is not
/// numeric, or is below 1. Large limits are rejected rather than clamped.
pub fn resolve_ledger_limit(limit: Option<&Limit>) -> Result<usize, Error> {
    let Some(limit) = limit else {
        return Ok(DEFAULT_LEDGER_LIMIT);
    };

    match limit.parse() {
        Some(n) if n > MAX_LIMIT => Err(Error::InvalidInput(format!("limit must not exceed {MAX_LIMIT} (got {n})"))),
        Some(n) if n >= 1 => Ok(n as usize),
        Some(n) => Err(Error::InvalidInput(format!("limit must be at least 1 (got {n})"))),
        None => Err(Error::InvalidInput(format!("limit is not a number: {limit:?}"))),
    }
}

/// Resolve a store listing limit, clamping into `1..=MAX_LIMIT`.
///
/// Missing, non-numeric, and non-positive values fall back to
/// [`DEFAULT_STORE_LIMIT`].
pub fn resolve_store_limit(limit: Option<&Limit>) -> usize {
    match limit.and_then(Limit::parse) {
        Some(n) if n >= 1 => n.min(MAX_LIMIT) as usize,
        _ => DEFAULT_STORE_LIMIT,
    }
}
