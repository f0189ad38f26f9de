//! Application constants
//!
//! Storage keys, whitelists and defaults shared by the preference and
//! analytics layers.

/// Namespace prepended to every key the preference store writes.
pub const PREFERENCE_KEY_PREFIX: &str = "dashsync:preferences:";

/// Language codes the dashboard ships translations for.
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "pt", "ja", "zh"];

/// Version stamped on exported preference snapshots.
pub const PREFERENCE_SNAPSHOT_VERSION: &str = "1.0";

/// Major snapshot version this build can import.
pub const PREFERENCE_SNAPSHOT_MAJOR: u32 = 1;

// Analytics cache defaults
pub const DEFAULT_ANALYTICS_TTL_SECS: u64 = 300;
pub const DEFAULT_BILLING_TTL_SECS: u64 = 900;
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;

// HTTP defaults
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_HTTP_MAX_ATTEMPTS: usize = 3;
