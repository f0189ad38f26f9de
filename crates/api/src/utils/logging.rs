use std::time::Duration;

use dashsync_domain::{DashSyncError, LoggingConfig};
use tracing::{info, warn};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `config.level`. Returns `false` if a subscriber was
/// already installed (tests, embedding hosts).
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json().with_current_span(false)).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };

    installed.is_ok()
}

/// Log the outcome of a command execution with structured fields.
///
/// `command` is a stable identifier such as `"analytics::refresh_domain"`;
/// callers must not put user data in it.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    success: bool,
    error_type: Option<&'static str>,
) {
    let duration_ms = elapsed.as_millis() as u64;

    if success {
        info!(command, duration_ms, "command_execution_success");
    } else {
        warn!(command, duration_ms, error_type, "command_execution_failure");
    }
}

/// Convert a `DashSyncError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &DashSyncError) -> &'static str {
    match error {
        DashSyncError::Storage(_) => "storage",
        DashSyncError::Serialization(_) => "serialization",
        DashSyncError::Validation(_) => "validation",
        DashSyncError::Network(_) => "network",
        DashSyncError::Config(_) => "config",
        DashSyncError::NotFound(_) => "not_found",
        DashSyncError::Unavailable(_) => "unavailable",
        DashSyncError::Internal(_) => "internal",
    }
}
