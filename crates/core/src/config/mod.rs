//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SCANVAULT_*)
//! 2. TOML config file (if SCANVAULT_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::{DEFAULT_MAX_ENTRIES, DEFAULT_TTL, ResultCache};
use crate::ledger::{DEFAULT_LEDGER_PATH, DEFAULT_SOURCE, Ledger};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SCANVAULT_*)
/// 2. TOML config file (if SCANVAULT_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the newline-delimited ledger file.
    ///
    /// Set via SCANVAULT_LEDGER_PATH environment variable.
    #[serde(default = "default_ledger_path")]
    pub ledger_path: PathBuf,

    /// Source stamped on ledger records that arrive without one.
    ///
    /// Set via SCANVAULT_DEFAULT_SOURCE environment variable.
    #[serde(default = "default_source")]
    pub default_source: String,

    /// Result cache time-to-live in seconds.
    ///
    /// Set via SCANVAULT_CACHE_TTL_SECS environment variable.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Result cache entry ceiling.
    ///
    /// Set via SCANVAULT_CACHE_MAX_ENTRIES environment variable.
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
}

fn default_ledger_path() -> PathBuf {
    PathBuf::from(DEFAULT_LEDGER_PATH)
}

fn default_source() -> String {
    DEFAULT_SOURCE.into()
}

fn default_cache_ttl_secs() -> u64 {
    DEFAULT_TTL.as_secs()
}

fn default_cache_max_entries() -> usize {
    DEFAULT_MAX_ENTRIES
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ledger_path: default_ledger_path(),
            default_source: default_source(),
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_max_entries: default_cache_max_entries(),
        }
    }
}

impl AppConfig {
    /// Cache TTL as Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    /// Ledger handle for the configured path and default source.
    pub fn ledger(&self) -> Ledger {
        Ledger::open(&self.ledger_path).with_default_source(self.default_source.clone())
    }

    /// Empty result cache sized by this configuration.
    pub fn result_cache<V: Clone>(&self) -> ResultCache<V> {
        ResultCache::with_limits(self.cache_ttl(), self.cache_max_entries)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SCANVAULT_`
    /// 2. TOML file from `SCANVAULT_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SCANVAULT_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SCANVAULT_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.ledger_path, PathBuf::from("data/ledger/opportunities.jsonl"));
        assert_eq!(config.default_source, "scan");
        assert_eq!(config.cache_ttl_secs, 600);
        assert_eq!(config.cache_max_entries, 1000);
    }

    #[test]
    fn test_cache_ttl_duration() {
        let config = AppConfig::default();
        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
    }

    #[test]
    fn test_ledger_from_config() {
        let config = AppConfig { ledger_path: PathBuf::from("tmp/news.jsonl"), ..Default::default() };
        let ledger = config.ledger();
        assert_eq!(ledger.path(), PathBuf::from("tmp/news.jsonl").as_path());
    }

    #[test]
    fn test_result_cache_from_config() {
        let config = AppConfig { cache_max_entries: 1, ..Default::default() };
        let mut cache = config.result_cache::<u32>();
        cache.set("a", 1);
        cache.set("b", 2);
        assert_eq!(cache.len(), 1);
    }
}
