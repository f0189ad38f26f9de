//! Preference types shared by the local store, the sync coordinator and
//! the server adapter.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{PREFERENCE_KEY_PREFIX, PREFERENCE_SNAPSHOT_VERSION};
use crate::impl_domain_enum_conversions;

/// Colour scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

impl_domain_enum_conversions!(Theme {
    Light => "light",
    Dark => "dark",
    System => "system",
});

/// Row spacing in data tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableDensity {
    Compact,
    Normal,
    #[default]
    Comfortable,
}

impl_domain_enum_conversions!(TableDensity {
    Compact => "compact",
    Normal => "normal",
    Comfortable => "comfortable",
});

/// Navigation sidebar presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SidebarView {
    #[default]
    Expanded,
    Collapsed,
    Mini,
}

impl_domain_enum_conversions!(SidebarView {
    Expanded => "expanded",
    Collapsed => "collapsed",
    Mini => "mini",
});

/// UI language. Mirrors [`SUPPORTED_LANGUAGES`](crate::constants::SUPPORTED_LANGUAGES).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Es,
    Fr,
    De,
    Pt,
    Ja,
    Zh,
}

impl_domain_enum_conversions!(Language {
    En => "en",
    Es => "es",
    Fr => "fr",
    De => "de",
    Pt => "pt",
    Ja => "ja",
    Zh => "zh",
});

/// Keys the local preference store knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    Theme,
    TableDensity,
    SidebarCollapsed,
    SidebarView,
    Language,
}

impl_domain_enum_conversions!(PreferenceKey {
    Theme => "theme",
    TableDensity => "tableDensity",
    SidebarCollapsed => "sidebarCollapsed",
    SidebarView => "sidebarView",
    Language => "language",
});

impl PreferenceKey {
    /// Namespaced key as written to the backing store.
    pub fn storage_key(&self) -> String {
        format!("{PREFERENCE_KEY_PREFIX}{}", self.as_str())
    }
}

/// Preferences held in local storage.
///
/// `language` stays `None` until the server's value has been synced down,
/// so a fresh install serializes to exactly the four UI fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPreferences {
    pub theme: Theme,
    pub table_density: TableDensity,
    pub sidebar_collapsed: bool,
    pub sidebar_view: SidebarView,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

/// Preferences owned by the user's server-side profile.
///
/// Values arrive from the hosted backend unchecked, hence plain strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerUserPreferences {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub time_format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_notifications: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub push_notifications: Option<bool>,
}

/// Server-authoritative fields held locally, ready to be written upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerPreferencesPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<Language>,
}

impl ServerPreferencesPatch {
    /// `true` when there is nothing to send.
    pub fn is_empty(&self) -> bool {
        self.language.is_none()
    }
}

/// Merge view handed to the UI. Recomputed on demand, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncedPreferences {
    pub server: ServerUserPreferences,
    pub client: ClientPreferences,
}

/// Versioned export of the client preferences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSnapshot {
    pub client: ClientPreferences,
    pub timestamp: DateTime<Utc>,
    pub version: String,
}

impl PreferenceSnapshot {
    /// Snapshot of `client` stamped with the current version and time.
    pub fn capture(client: ClientPreferences) -> Self {
        Self { client, timestamp: Utc::now(), version: PREFERENCE_SNAPSHOT_VERSION.to_string() }
    }
}

/// Outcome of validating a preference payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    /// Report for the collected errors; valid when there are none.
    pub fn from_errors(errors: Vec<String>) -> Self {
        Self { is_valid: errors.is_empty(), errors }
    }

    /// A passing report.
    pub fn valid() -> Self {
        Self::from_errors(Vec::new())
    }
}
