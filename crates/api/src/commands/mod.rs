//! Command surface for the dashboard UI.
//!
//! Commands take the [`AppContext`](crate::AppContext) and plain
//! arguments, and return `Result<T, String>` so the UI gets a displayable
//! error. Each one logs its name, duration and outcome.

pub mod analytics;
pub mod preferences;

use std::str::FromStr;

use dashsync_domain::{DashSyncError, Result as DomainResult};

pub use analytics::{
    get_analytics, get_cache_stats, get_loading_state, invalidate_analytics,
    record_dashboard_action, refresh_all_analytics, refresh_domain, subscribe_loading_state,
    CacheStatsView,
};
pub use preferences::{
    export_preferences, get_client_preferences, import_preferences, pull_preferences,
    push_preferences, reset_preferences, set_language, set_sidebar_view, set_table_density,
    set_theme, sync_server_preferences, toggle_sidebar, update_client_preferences, ServerSyncView,
};

/// Parse a UI-supplied enum argument.
fn parse_arg<T>(value: &str) -> DomainResult<T>
where
    T: FromStr<Err = String>,
{
    value.trim().parse().map_err(DashSyncError::Validation)
}
