//! Configuration management

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_ANALYTICS_TTL_SECS, DEFAULT_BILLING_TTL_SECS, DEFAULT_CACHE_MAX_ENTRIES,
    DEFAULT_HTTP_MAX_ATTEMPTS, DEFAULT_HTTP_TIMEOUT_SECS,
};
use crate::types::AnalyticsDomain;

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub analytics: AnalyticsConfig,
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
}

/// Which key-value backend holds client preferences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// Process memory; lost on exit
    #[default]
    Memory,
    /// JSON document on disk
    File,
    /// No persistent storage (server-side rendering, headless jobs)
    Unavailable,
}

/// Preference storage configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Path of the JSON document when `backend` is `file`
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Memory, path: "dashsync-preferences.json".to_string() }
    }
}

/// Analytics backend configuration.
///
/// An empty `base_url` means no analytics service is configured; the
/// coordinators then run cache-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyticsConfig {
    pub base_url: String,
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    pub timeout_seconds: u64,
    pub max_attempts: usize,
}

impl AnalyticsConfig {
    /// Whether a backend URL was supplied.
    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            api_token: None,
            timeout_seconds: DEFAULT_HTTP_TIMEOUT_SECS,
            max_attempts: DEFAULT_HTTP_MAX_ATTEMPTS,
        }
    }
}

/// Analytics cache configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub ttl_seconds: u64,
    pub max_entries: usize,
    /// Per-domain TTL overrides
    pub domain_ttl_seconds: BTreeMap<AnalyticsDomain, u64>,
}

impl CacheSettings {
    /// TTL in seconds for `domain`, falling back to the default.
    pub fn ttl_for(&self, domain: AnalyticsDomain) -> u64 {
        self.domain_ttl_seconds.get(&domain).copied().unwrap_or(self.ttl_seconds)
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        let mut domain_ttl_seconds = BTreeMap::new();
        domain_ttl_seconds.insert(AnalyticsDomain::Billing, DEFAULT_BILLING_TTL_SECS);

        Self {
            ttl_seconds: DEFAULT_ANALYTICS_TTL_SECS,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            domain_ttl_seconds,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default `EnvFilter` directive; `RUST_LOG` wins when set
    pub level: String,
    /// Emit JSON lines instead of compact text
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
