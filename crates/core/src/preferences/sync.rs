//! Preference sync coordinator.
//!
//! Decides which side owns each preference, merges server and client views,
//! and runs the multi-key operations (reset, import, patch) as
//! all-or-nothing writes against the [`LocalPreferenceStore`].
//!
//! # Ownership
//!
//! | Field | Owner |
//! |-------|-------|
//! | `language` | server (copied down, pushed back up) |
//! | `theme`, `tableDensity`, `sidebarCollapsed`, `sidebarView` | client |
//! | `timezone`, date/time formats, notification flags | server only |

use std::sync::Arc;

use dashsync_domain::constants::{PREFERENCE_SNAPSHOT_MAJOR, SUPPORTED_LANGUAGES};
use dashsync_domain::{
    ClientPreferences, DashSyncError, Language, PreferenceKey, PreferenceSnapshot, Result,
    ServerPreferencesPatch, ServerUserPreferences, SidebarView, SyncedPreferences, TableDensity,
    Theme, ValidationReport,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::ports::ServerPreferencesPort;
use super::store::LocalPreferenceStore;
use super::validation::validate_preferences;

/// Client keys in the order multi-key writes apply them.
const CLIENT_KEYS: [PreferenceKey; 5] = [
    PreferenceKey::Theme,
    PreferenceKey::TableDensity,
    PreferenceKey::SidebarCollapsed,
    PreferenceKey::SidebarView,
    PreferenceKey::Language,
];

/// Preference sync coordinator.
pub struct PreferenceSyncCoordinator {
    store: LocalPreferenceStore,
    server: Option<Arc<dyn ServerPreferencesPort>>,
}

impl PreferenceSyncCoordinator {
    /// Coordinator without a server profile port.
    pub fn new(store: LocalPreferenceStore) -> Self {
        Self { store, server: None }
    }

    /// Attach the port used by [`pull_from_server`](Self::pull_from_server)
    /// and [`push_to_server`](Self::push_to_server).
    pub fn with_server(mut self, server: Arc<dyn ServerPreferencesPort>) -> Self {
        self.server = Some(server);
        self
    }

    pub fn store(&self) -> &LocalPreferenceStore {
        &self.store
    }

    /// Copy server-authoritative fields (`language`) into local storage.
    ///
    /// Returns `false` when the server value is unsupported or the write
    /// fails; never errors. A profile without a language is a successful
    /// no-op.
    pub fn sync_server_to_client(&self, server: &ServerUserPreferences) -> bool {
        match self.copy_server_fields(server) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "failed to sync server preferences to client");
                false
            }
        }
    }

    fn copy_server_fields(&self, server: &ServerUserPreferences) -> Result<()> {
        let Some(code) = server.language.as_deref() else {
            return Ok(());
        };

        if !SUPPORTED_LANGUAGES.contains(&code) {
            return Err(DashSyncError::Validation(format!("language: unsupported '{code}'")));
        }
        let language: Language = code.parse().map_err(DashSyncError::Validation)?;

        if self.store.try_get::<Language>(PreferenceKey::Language).ok().flatten() == Some(language)
        {
            debug!(%language, "language already in sync");
            return Ok(());
        }

        self.store.set(PreferenceKey::Language, &language)
    }

    /// Locally held server-authoritative fields, for writing upstream.
    pub fn client_preferences_for_server(&self) -> ServerPreferencesPatch {
        ServerPreferencesPatch { language: self.store.language() }
    }

    /// Every client preference; the default bundle if storage is unreadable.
    pub fn all_client_preferences(&self) -> ClientPreferences {
        self.store.load_client_preferences().unwrap_or_else(|err| {
            warn!(error = %err, "preference storage unreadable; using defaults");
            ClientPreferences::default()
        })
    }

    /// Combine a server profile with client preferences (read from the
    /// store when `client` is `None`).
    pub fn merge_preferences(
        &self,
        server: &ServerUserPreferences,
        client: Option<ClientPreferences>,
    ) -> SyncedPreferences {
        SyncedPreferences {
            server: server.clone(),
            client: client.unwrap_or_else(|| self.all_client_preferences()),
        }
    }

    /// See [`validate_preferences`].
    pub fn validate_preferences(&self, payload: &Value) -> ValidationReport {
        validate_preferences(payload)
    }

    /// Overwrite every client preference with its default and forget the
    /// synced language.
    pub fn reset_all_preferences(&self) -> bool {
        let defaults = serde_json::to_value(ClientPreferences::default())
            .map_err(DashSyncError::from)
            .and_then(|patch| self.write_all(&patch, true));

        match defaults.and_then(|()| self.store.purge_unknown_keys()) {
            Ok(_) => {
                info!("preferences reset to defaults");
                true
            }
            Err(err) => {
                error!(error = %err, "failed to reset preferences");
                false
            }
        }
    }

    /// Versioned snapshot of the current client preferences.
    pub fn export_all_preferences(&self) -> PreferenceSnapshot {
        PreferenceSnapshot::capture(self.all_client_preferences())
    }

    /// Apply an exported snapshot.
    ///
    /// Rejects snapshots from another major version and snapshots with any
    /// invalid field. Applies every field or none.
    pub fn import_preferences(&self, data: &Value) -> bool {
        let version = data.get("version").and_then(Value::as_str).unwrap_or_default();
        if major_version(version) != Some(PREFERENCE_SNAPSHOT_MAJOR) {
            warn!(version, "rejected preference snapshot with unsupported version");
            return false;
        }

        let Some(client) = data.get("client").filter(|c| c.is_object()) else {
            warn!("rejected preference snapshot without client preferences");
            return false;
        };

        match self.apply_client_patch(client) {
            Ok(report) if report.is_valid => {
                info!(version, "preferences imported");
                true
            }
            Ok(report) => {
                warn!(errors = ?report.errors, "rejected invalid preference snapshot");
                false
            }
            Err(err) => {
                error!(error = %err, "preference import failed; previous values restored");
                false
            }
        }
    }

    /// Validate and apply a partial client preference object.
    ///
    /// Nothing is written unless every field is valid; a storage failure is
    /// reported as a `storage` error after earlier writes are rolled back.
    pub fn update_client_preferences(&self, patch: &Value) -> ValidationReport {
        self.apply_client_patch(patch).unwrap_or_else(|err| {
            error!(error = %err, "preference update failed; previous values restored");
            ValidationReport::from_errors(vec![format!("storage: {err}")])
        })
    }

    pub fn set_theme(&self, theme: Theme) -> Result<()> {
        self.store.set(PreferenceKey::Theme, &theme)
    }

    pub fn set_table_density(&self, density: TableDensity) -> Result<()> {
        self.store.set(PreferenceKey::TableDensity, &density)
    }

    pub fn set_sidebar_collapsed(&self, collapsed: bool) -> Result<()> {
        self.store.set(PreferenceKey::SidebarCollapsed, &collapsed)
    }

    /// Flip the collapsed flag and return the new value.
    pub fn toggle_sidebar(&self) -> Result<bool> {
        let collapsed = !self.store.sidebar_collapsed();
        self.set_sidebar_collapsed(collapsed)?;
        Ok(collapsed)
    }

    pub fn set_sidebar_view(&self, view: SidebarView) -> Result<()> {
        self.store.set(PreferenceKey::SidebarView, &view)
    }

    /// Change the language locally. Use
    /// [`push_to_server`](Self::push_to_server) to persist it upstream.
    pub fn set_language(&self, language: Language) -> Result<()> {
        self.store.set(PreferenceKey::Language, &language)
    }

    /// Fetch the server profile, sync it down and return the merge view.
    pub async fn pull_from_server(&self) -> Result<SyncedPreferences> {
        let server = self.server_port()?.fetch().await?;
        if !self.sync_server_to_client(&server) {
            warn!("server profile fetched but not applied locally");
        }
        Ok(self.merge_preferences(&server, None))
    }

    /// Send server-authoritative client fields upstream.
    ///
    /// Returns `false` when there is nothing to send.
    pub async fn push_to_server(&self) -> Result<bool> {
        let port = self.server_port()?;
        let patch = self.client_preferences_for_server();
        if patch.is_empty() {
            debug!("no server-authoritative preferences to push");
            return Ok(false);
        }

        port.update(&patch).await?;
        info!(language = ?patch.language, "pushed preferences to server");
        Ok(true)
    }

    fn server_port(&self) -> Result<&Arc<dyn ServerPreferencesPort>> {
        self.server
            .as_ref()
            .ok_or_else(|| DashSyncError::Unavailable("server preferences not configured".into()))
    }

    fn apply_client_patch(&self, patch: &Value) -> Result<ValidationReport> {
        let report = validate_preferences(patch);
        if !report.is_valid {
            return Ok(report);
        }

        self.write_all(patch, false)?;
        Ok(report)
    }

    /// Write every client key present in `patch`. With `clear_missing`,
    /// keys absent from the patch are removed. On failure, every key
    /// touched so far is restored to its previous raw value.
    fn write_all(&self, patch: &Value, clear_missing: bool) -> Result<()> {
        let mut writes = Vec::new();
        for key in CLIENT_KEYS {
            match patch.get(key.as_str()).filter(|value| !value.is_null()) {
                Some(value) => writes.push((key, Some(value.to_string()))),
                None if clear_missing => writes.push((key, None)),
                None => {}
            }
        }

        let mut previous = Vec::with_capacity(writes.len());
        for (key, raw) in &writes {
            let outcome = self.store.raw(*key).and_then(|prior| {
                let written = self.store.restore_raw(*key, raw.as_deref());
                previous.push((*key, prior));
                written
            });

            if let Err(err) = outcome {
                self.roll_back(&previous);
                return Err(err);
            }
        }

        debug!(keys = writes.len(), "applied preference writes");
        Ok(())
    }

    fn roll_back(&self, previous: &[(PreferenceKey, Option<String>)]) {
        for (key, prior) in previous.iter().rev() {
            if let Err(err) = self.store.restore_raw(*key, prior.as_deref()) {
                error!(key = %key, error = %err, "failed to roll back preference");
            }
        }
    }
}

/// Leading integer of a `major.minor` version string.
fn major_version(version: &str) -> Option<u32> {
    version.split('.').next()?.trim().parse().ok()
}
