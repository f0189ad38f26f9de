//! Command execution helpers
//!
//! Every command times its body, logs the outcome and hands the UI a plain
//! error string.

use std::future::Future;
use std::time::Instant;

use dashsync_domain::Result as DomainResult;

use crate::utils::logging::{error_label, log_command_execution};

/// Run `command_fn`, log its outcome and convert the error to a string.
///
/// # Example
///
/// ```rust,ignore
/// pub async fn pull_preferences(ctx: &AppContext) -> Result<SyncedPreferences, String> {
///     execute_command("preferences::pull_preferences", || async {
///         ctx.preferences.pull_from_server().await
///     })
///     .await
/// }
/// ```
pub async fn execute_command<F, Fut, T>(command_name: &str, command_fn: F) -> Result<T, String>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = DomainResult<T>>,
{
    let start = Instant::now();
    let result = command_fn().await;

    let error_type = result.as_ref().err().map(error_label);
    log_command_execution(command_name, start.elapsed(), result.is_ok(), error_type);

    result.map_err(|e| e.to_string())
}

/// Log a command whose body cannot fail.
pub fn record_infallible<T>(command_name: &str, start: Instant, value: T) -> T {
    log_command_execution(command_name, start.elapsed(), true, None);
    value
}
