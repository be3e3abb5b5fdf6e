//! Configuration loading.
//! JSON file first (every field optional), then `POSTLINGO_*` environment
//! overrides, then validation.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::generation::WritePolicy;
use crate::translate::AUTO_DETECT;

pub const ENV_BASE_URL: &str = "POSTLINGO_BASE_URL";
pub const ENV_TIMEOUT_MS: &str = "POSTLINGO_TIMEOUT_MS";
pub const ENV_SOURCE_LANG: &str = "POSTLINGO_SOURCE_LANG";
pub const ENV_MAX_ENTRIES: &str = "POSTLINGO_MAX_ENTRIES";
pub const ENV_WRITE_POLICY: &str = "POSTLINGO_WRITE_POLICY";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub google: GoogleConfig,
}

/// Store behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// `None` keeps every key until cleared.
    pub max_entries: Option<usize>,
    pub write_policy: WritePolicy,
    /// Source language passed to the provider.
    pub source_language: String,
    /// Buffered events per subscriber before it starts lagging.
    pub event_capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: None,
            write_policy: WritePolicy::default(),
            source_language: AUTO_DETECT.to_string(),
            event_capacity: 256,
        }
    }
}

/// Google `gtx` endpoint client settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub base_url: String,
    pub timeout_ms: u64,
    pub pool_max_idle_per_host: usize,
    pub pool_idle_timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://translate.googleapis.com".to_string(),
            timeout_ms: 10_000,
            pool_max_idle_per_host: 4,
            pool_idle_timeout_secs: 90,
        }
    }
}

impl GoogleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn pool_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.pool_idle_timeout_secs)
    }
}

impl Config {
    /// Load from a JSON file. Missing fields take their defaults.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `POSTLINGO_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable source.
    pub fn apply_vars<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_BASE_URL) {
            self.google.base_url = url;
        }
        if let Some(ms) = lookup(ENV_TIMEOUT_MS) {
            self.google.timeout_ms = ms
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid(format!("{ENV_TIMEOUT_MS}={ms}")))?;
        }
        if let Some(lang) = lookup(ENV_SOURCE_LANG) {
            self.cache.source_language = lang;
        }
        if let Some(max) = lookup(ENV_MAX_ENTRIES) {
            let max = max.trim();
            self.cache.max_entries = if max.is_empty() || max == "unbounded" {
                None
            } else {
                Some(
                    max.parse()
                        .map_err(|_| ConfigError::Invalid(format!("{ENV_MAX_ENTRIES}={max}")))?,
                )
            };
        }
        if let Some(policy) = lookup(ENV_WRITE_POLICY) {
            self.cache.write_policy = policy.parse().map_err(ConfigError::Invalid)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.google.base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("google.base_url is empty".into()));
        }
        if self.google.timeout_ms == 0 {
            return Err(ConfigError::Invalid("google.timeout_ms must be > 0".into()));
        }
        if self.cache.max_entries == Some(0) {
            return Err(ConfigError::Invalid("cache.max_entries must be > 0".into()));
        }
        if self.cache.event_capacity == 0 {
            return Err(ConfigError::Invalid("cache.event_capacity must be > 0".into()));
        }
        if self.cache.source_language.trim().is_empty() {
            return Err(ConfigError::Invalid("cache.source_language is empty".into()));
        }
        Ok(())
    }
}
