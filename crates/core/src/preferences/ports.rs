//! Ports the preference layer depends on.
//!
//! # Example
//!
//! ```no_run
//! use dashsync_core::KeyValueStore;
//!
//! fn stored_theme(store: &dyn KeyValueStore) -> Option<String> {
//!     if !store.is_available() {
//!         return None;
//!     }
//!     store.get_item("dashsync:preferences:theme").ok().flatten()
//! }
//! ```

use async_trait::async_trait;
use dashsync_domain::{Result, ServerPreferencesPatch, ServerUserPreferences};

/// Persistent string key-value storage for client-side preferences.
///
/// Implementations may be unavailable (server-side rendering, headless
/// jobs) or fail on individual calls (quota, permissions). Callers check
/// [`is_available`](Self::is_available) and handle every `Err`.
pub trait KeyValueStore: Send + Sync {
    /// Whether the backend can be used at all in this process.
    fn is_available(&self) -> bool;

    /// Raw value stored under `key`, or `None` when absent.
    fn get_item(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set_item(&self, key: &str, value: &str) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<()>;

    /// Every key currently stored.
    fn keys(&self) -> Result<Vec<String>>;
}

/// Port for the user's server-side preference profile.
#[async_trait]
pub trait ServerPreferencesPort: Send + Sync {
    /// Fetch the current profile.
    async fn fetch(&self) -> Result<ServerUserPreferences>;

    /// Apply `patch` and return the updated profile.
    async fn update(&self, patch: &ServerPreferencesPatch) -> Result<ServerUserPreferences>;
}
