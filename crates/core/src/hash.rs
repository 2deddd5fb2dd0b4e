//! Content-addressed identity generation.
//!
//! Records are canonicalized before hashing: volatile fields are dropped,
//! the remaining fields are ordered by name, and the result is serialized
//! as compact JSON. Ledger ids and cache keys share this canonical form and
//! differ only in the excluded field set and the digest length.

use std::collections::BTreeMap;

use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

use crate::Record;

/// Length of a ledger record id in hex characters.
pub const LEDGER_ID_LEN: usize = 16;

/// Fields that never contribute to a ledger record id.
///
/// Run correlation, write timestamps, rank fields, and the id fields
/// themselves change between runs for the same logical record.
pub const LEDGER_VOLATILE_FIELDS: &[&str] = &[
    "id",
    "opportunity_id",
    "run_id",
    "runId",
    "scan_id",
    "scanId",
    "ts",
    "timestamp",
    "created_at",
    "createdAt",
    "updated_at",
    "updatedAt",
    "rank",
];

/// Build the canonical JSON form of `record` without the `excluded` fields.
///
/// Exclusion applies to top-level fields only. Object keys are emitted in
/// lexicographic order at every depth.
pub fn canonical_json(record: &Record, excluded: &[&str]) -> String {
    let stable = record.iter().filter(|(key, _)| !excluded.contains(&key.as_str()));
    Value::Object(sorted_map(stable)).to_string()
}

fn sorted_map<'a>(fields: impl Iterator<Item = (&'a String, &'a Value)>) -> Map<String, Value> {
    let ordered: BTreeMap<&String, &Value> = fields.collect();
    let mut map = Map::with_capacity(ordered.len());
    for (key, value) in ordered {
        map.insert(key.clone(), sorted_value(value));
    }
    map
}

fn sorted_value(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(sorted_map(map.iter())),
        Value::Array(items) => Value::Array(items.iter().map(sorted_value).collect()),
        other => other.clone(),
    }
}

/// Full-length SHA-256 hex digest of the canonical form.
pub fn stable_digest(record: &Record, excluded: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json(record, excluded).as_bytes());
    hex::encode(hasher.finalize())
}

/// Derive the deterministic ledger id for a record.
///
/// Same stable content yields the same id regardless of field insertion order
/// or the values of any field in [`LEDGER_VOLATILE_FIELDS`].
pub fn derive_id(record: &Record) -> String {
    let mut digest = stable_digest(record, LEDGER_VOLATILE_FIELDS);
    digest.truncate(LEDGER_ID_LEN);
    digest
}
