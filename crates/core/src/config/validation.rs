//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `ledger_path` or `default_source` is empty
    /// - `cache_ttl_secs` is 0 or exceeds one day
    /// - `cache_max_entries` is 0 or exceeds 1,000,000
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { field: "ledger_path".into(), reason: "must not be empty".into() });
        }

        if self.default_source.is_empty() {
            return Err(ConfigError::Invalid { field: "default_source".into(), reason: "must not be empty".into() });
        }

        if self.cache_ttl_secs == 0 {
            return Err(ConfigError::Invalid { field: "cache_ttl_secs".into(), reason: "must be greater than 0".into() });
        }
        if self.cache_ttl_secs > 86_400 {
            return Err(ConfigError::Invalid {
                field: "cache_ttl_secs".into(),
                reason: "must not exceed one day (86400s)".into(),
            });
        }

        if self.cache_max_entries == 0 {
            return Err(ConfigError::Invalid {
                field: "cache_max_entries".into(),
                reason: "must be greater than 0".into(),
            });
        }
        if self.cache_max_entries > 1_000_000 {
            return Err(ConfigError::Invalid {
                field: "cache_max_entries".into(),
                reason: "must not exceed 1000000".into(),
            });
        }

        Ok(())
    }
}
