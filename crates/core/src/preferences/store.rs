//! Typed access to client preferences over a [`KeyValueStore`].
//!
//! Values are stored as JSON under [`PREFERENCE_KEY_PREFIX`]. Every read is
//! a `Result` internally; [`LocalPreferenceStore::get`] is the boundary that
//! turns a failed or malformed read into "log and use the default".

use std::sync::Arc;

use dashsync_domain::constants::PREFERENCE_KEY_PREFIX;
use dashsync_domain::{
    ClientPreferences, DashSyncError, Language, PreferenceKey, Result, SidebarView, TableDensity,
    Theme,
};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error, warn};

use super::ports::KeyValueStore;

/// Typed preference accessors.
///
/// Cheap to clone; clones share the backend.
#[derive(Clone)]
pub struct LocalPreferenceStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalPreferenceStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Whether the backend can be used in this process.
    pub fn is_available(&self) -> bool {
        self.backend.is_available()
    }

    /// Stored value for `key`.
    ///
    /// `Ok(None)` when nothing is stored or the backend is unavailable.
    /// Malformed JSON is reported as [`DashSyncError::Serialization`].
    pub fn try_get<T: DeserializeOwned>(&self, key: PreferenceKey) -> Result<Option<T>> {
        let Some(raw) = self.raw(key)? else {
            return Ok(None);
        };

        serde_json::from_str(&raw)
            .map(Some)
            .map_err(|err| DashSyncError::Serialization(format!("{key}: {err}")))
    }

    /// Stored value for `key`, or its default when absent, malformed or
    /// unreadable.
    pub fn get<T: DeserializeOwned + Default>(&self, key: PreferenceKey) -> T {
        self.field(key).unwrap_or_else(|err| {
            warn!(key = %key, error = %err, "preference read failed; using default");
            T::default()
        })
    }

    /// Persist `value` under `key`.
    ///
    /// A no-op when the backend is unavailable. Backend failures are logged
    /// and returned.
    pub fn set<T: Serialize>(&self, key: PreferenceKey, value: &T) -> Result<()> {
        if !self.is_available() {
            debug!(key = %key, "storage unavailable; preference not persisted");
            return Ok(());
        }

        let raw = serde_json::to_string(value)?;
        self.backend.set_item(&key.storage_key(), &raw).inspect_err(|err| {
            error!(key = %key, error = %err, "failed to persist preference");
        })
    }

    /// Delete `key`. A no-op when the backend is unavailable.
    pub fn remove(&self, key: PreferenceKey) -> Result<()> {
        if !self.is_available() {
            return Ok(());
        }

        self.backend.remove_item(&key.storage_key()).inspect_err(|err| {
            error!(key = %key, error = %err, "failed to remove preference");
        })
    }

    /// Raw stored string for `key`, used to snapshot state before a
    /// multi-key write.
    pub fn raw(&self, key: PreferenceKey) -> Result<Option<String>> {
        if !self.is_available() {
            return Ok(None);
        }
        self.backend.get_item(&key.storage_key())
    }

    /// Put back a value captured with [`raw`](Self::raw); `None` deletes.
    pub fn restore_raw(&self, key: PreferenceKey, raw: Option<&str>) -> Result<()> {
        if !self.is_available() {
            return Ok(());
        }

        match raw {
            Some(value) => self.backend.set_item(&key.storage_key(), value),
            None => self.backend.remove_item(&key.storage_key()),
        }
    }

    /// Remove keys under the preference namespace that no [`PreferenceKey`]
    /// maps to (left behind by older builds). Returns how many were dropped.
    pub fn purge_unknown_keys(&self) -> Result<usize> {
        if !self.is_available() {
            return Ok(0);
        }

        let mut removed = 0;
        for key in self.backend.keys()? {
            let Some(name) = key.strip_prefix(PREFERENCE_KEY_PREFIX) else {
                continue;
            };
            if name.parse::<PreferenceKey>().is_err() {
                self.backend.remove_item(&key)?;
                removed += 1;
            }
        }

        if removed > 0 {
            debug!(removed, "purged unknown preference keys");
        }
        Ok(removed)
    }

    /// Every client preference.
    ///
    /// Malformed fields fall back to their defaults individually; a backend
    /// failure is returned so the caller can decide on a fallback for the
    /// whole bundle.
    pub fn load_client_preferences(&self) -> Result<ClientPreferences> {
        Ok(ClientPreferences {
            theme: self.field(PreferenceKey::Theme)?,
            table_density: self.field(PreferenceKey::TableDensity)?,
            sidebar_collapsed: self.field(PreferenceKey::SidebarCollapsed)?,
            sidebar_view: self.field(PreferenceKey::SidebarView)?,
            language: self.field(PreferenceKey::Language)?,
        })
    }

    pub fn theme(&self) -> Theme {
        self.get(PreferenceKey::Theme)
    }

    pub fn table_density(&self) -> TableDensity {
        self.get(PreferenceKey::TableDensity)
    }

    pub fn sidebar_collapsed(&self) -> bool {
        self.get(PreferenceKey::SidebarCollapsed)
    }

    pub fn sidebar_view(&self) -> SidebarView {
        self.get(PreferenceKey::SidebarView)
    }

    /// Synced language, `None` until the server's value has been copied.
    pub fn language(&self) -> Option<Language> {
        self.get(PreferenceKey::Language)
    }

    fn field<T: DeserializeOwned + Default>(&self, key: PreferenceKey) -> Result<T> {
        match self.try_get(key) {
            Ok(value) => Ok(value.unwrap_or_default()),
            Err(DashSyncError::Serialization(msg)) => {
                warn!(key = %key, error = %msg, "malformed stored preference; using default");
                Ok(T::default())
            }
            Err(err) => Err(err),
        }
    }
}
