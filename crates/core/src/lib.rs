//! # DashSync Core
//!
//! Business logic for the dashboard's preference sync and analytics cache.
//!
//! This crate contains:
//! - Port interfaces (traits) for storage and the hosted backend
//! - The local preference store and the preference sync coordinator
//! - The domain analytics cache, its invalidation rules and the refresh
//!   coordinator
//!
//! ## Architecture Principles
//! - Only depends on `dashsync-common` and `dashsync-domain`
//! - No HTTP, filesystem or platform code
//! - All external dependencies via traits

pub mod analytics;
pub mod preferences;

// Re-export specific items to avoid ambiguity
pub use analytics::ports::AnalyticsPort;
pub use analytics::{
    action_domain, dependent_domains, target_domains, AnalyticsRefreshCoordinator,
    DomainAnalyticsCache,
};
pub use preferences::ports::{KeyValueStore, ServerPreferencesPort};
pub use preferences::{
    validate_preferences, LocalPreferenceStore, PreferenceSyncCoordinator,
};
