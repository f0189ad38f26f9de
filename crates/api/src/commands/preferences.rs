//! Preference commands.
//!
//! Thin bindings over [`PreferenceSyncCoordinator`]: enum arguments arrive
//! as strings from the UI and are parsed here.
//!
//! [`PreferenceSyncCoordinator`]: dashsync_core::PreferenceSyncCoordinator

use std::time::Instant;

use dashsync_domain::{
    ClientPreferences, DashSyncError, Language, PreferenceSnapshot, ServerUserPreferences,
    SidebarView, SyncedPreferences, TableDensity, Theme, ValidationReport,
};
use serde::Serialize;
use serde_json::Value;
use tracing::{info, warn};

use super::parse_arg;
use crate::utils::command_helpers::{execute_command, record_infallible};
use crate::AppContext;

pub async fn get_client_preferences(ctx: &AppContext) -> Result<ClientPreferences, String> {
    let start = Instant::now();
    let prefs = ctx.preferences.all_client_preferences();
    Ok(record_infallible("preferences::get_client_preferences", start, prefs))
}

/// Validate and apply a partial preference object. Invalid fields come
/// back in the report; nothing is applied unless all are valid.
pub async fn update_client_preferences(
    ctx: &AppContext,
    patch: Value,
) -> Result<ValidationReport, String> {
    let start = Instant::now();
    let report = ctx.preferences.update_client_preferences(&patch);
    Ok(record_infallible("preferences::update_client_preferences", start, report))
}

pub async fn set_theme(ctx: &AppContext, theme: String) -> Result<(), String> {
    execute_command("preferences::set_theme", move || async move {
        ctx.preferences.set_theme(parse_arg::<Theme>(&theme)?)
    })
    .await
}

pub async fn set_table_density(ctx: &AppContext, density: String) -> Result<(), String> {
    execute_command("preferences::set_table_density", move || async move {
        ctx.preferences.set_table_density(parse_arg::<TableDensity>(&density)?)
    })
    .await
}

pub async fn set_sidebar_view(ctx: &AppContext, view: String) -> Result<(), String> {
    execute_command("preferences::set_sidebar_view", move || async move {
        ctx.preferences.set_sidebar_view(parse_arg::<SidebarView>(&view)?)
    })
    .await
}

/// Flip the sidebar and return whether it is now collapsed.
pub async fn toggle_sidebar(ctx: &AppContext) -> Result<bool, String> {
    execute_command("preferences::toggle_sidebar", move || async move {
        ctx.preferences.toggle_sidebar()
    })
    .await
}

/// Change the language locally and, when a backend is configured, push it
/// to the server profile.
pub async fn set_language(ctx: &AppContext, language: String) -> Result<bool, String> {
    execute_command("preferences::set_language", move || async move {
        ctx.preferences.set_language(parse_arg::<Language>(&language)?)?;
        match ctx.preferences.push_to_server().await {
            Err(DashSyncError::Unavailable(_)) => Ok(false),
            pushed => pushed,
        }
    })
    .await
}

pub async fn reset_preferences(ctx: &AppContext) -> Result<bool, String> {
    let start = Instant::now();
    let reset = ctx.preferences.reset_all_preferences();
    info!(reset, "preference reset requested");
    Ok(record_infallible("preferences::reset_preferences", start, reset))
}

pub async fn export_preferences(ctx: &AppContext) -> Result<PreferenceSnapshot, String> {
    let start = Instant::now();
    let snapshot = ctx.preferences.export_all_preferences();
    Ok(record_infallible("preferences::export_preferences", start, snapshot))
}

pub async fn import_preferences(ctx: &AppContext, snapshot: Value) -> Result<bool, String> {
    let start = Instant::now();
    let imported = ctx.preferences.import_preferences(&snapshot);
    Ok(record_infallible("preferences::import_preferences", start, imported))
}

/// Merge view plus whether the server profile was applied locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSyncView {
    /// `false` when the server language is unsupported or the write failed
    pub applied: bool,
    #[serde(flatten)]
    pub preferences: SyncedPreferences,
}

/// Apply a server profile the UI already holds and return the merge view.
pub async fn sync_server_preferences(
    ctx: &AppContext,
    server: ServerUserPreferences,
) -> Result<ServerSyncView, String> {
    let start = Instant::now();
    let applied = ctx.preferences.sync_server_to_client(&server);
    if !applied {
        warn!(language = ?server.language, "server profile not applied locally");
    }
    let preferences = ctx.preferences.merge_preferences(&server, None);
    let view = ServerSyncView { applied, preferences };
    Ok(record_infallible("preferences::sync_server_preferences", start, view))
}

/// Fetch the server profile, sync it down and return the merge view.
pub async fn pull_preferences(ctx: &AppContext) -> Result<SyncedPreferences, String> {
    execute_command("preferences::pull_preferences", move || async move {
        ctx.preferences.pull_from_server().await
    })
    .await
}

/// Push server-owned fields upstream; `false` when there was nothing to send.
pub async fn push_preferences(ctx: &AppContext) -> Result<bool, String> {
    execute_command("preferences::push_preferences", move || async move {
        ctx.preferences.push_to_server().await
    })
    .await
}
