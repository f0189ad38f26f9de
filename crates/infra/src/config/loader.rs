//! Configuration loader
//!
//! Loads application configuration from environment variables or files.
//!
//! ## Loading Strategy
//! 1. Environment variables, when `DASHSYNC_STORAGE_BACKEND` is set
//! 2. Otherwise the first config file found by [`probe_config_paths`]
//! 3. JSON and TOML are both accepted, chosen by file extension
//!
//! Every section is optional in both sources; missing values take their
//! defaults.
//!
//! ## Environment Variables
//! - `DASHSYNC_STORAGE_BACKEND`: `memory`, `file` or `unavailable` (required)
//! - `DASHSYNC_STORAGE_PATH`: preference file path for the `file` backend
//! - `DASHSYNC_ANALYTICS_BASE_URL`: backend base URL; empty disables it
//! - `DASHSYNC_ANALYTICS_TOKEN`: bearer token for the backend
//! - `DASHSYNC_ANALYTICS_TIMEOUT_SECS`: per-request timeout
//! - `DASHSYNC_ANALYTICS_MAX_ATTEMPTS`: attempts per request, retries included
//! - `DASHSYNC_CACHE_TTL_SECS`: default analytics cache TTL
//! - `DASHSYNC_CACHE_MAX_ENTRIES`: analytics cache capacity
//! - `DASHSYNC_LOG_LEVEL`: default tracing filter
//! - `DASHSYNC_LOG_JSON`: JSON log lines (true/false)
//!
//! ## File Locations
//! `config.{json,toml}` then `dashsync.{json,toml}`, first in the current
//! working directory and then next to the executable.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use dashsync_domain::{Config, DashSyncError, Result, StorageBackend};

/// Environment variable that switches on environment-based configuration.
pub const ENV_STORAGE_BACKEND: &str = "DASHSYNC_STORAGE_BACKEND";

const CONFIG_FILE_NAMES: [&str; 4] =
    ["config.json", "config.toml", "dashsync.json", "dashsync.toml"];

/// Load configuration from the environment, falling back to a file.
///
/// # Errors
/// Returns `DashSyncError::Config` if neither source is present, a present
/// source is malformed, or a value fails to parse.
pub fn load() -> Result<Config> {
    match load_from_env() {
        Ok(config) => {
            tracing::info!("Configuration loaded from environment variables");
            Ok(config)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Environment configuration unavailable, trying file");
            load_from_file(None)
        }
    }
}

/// Load configuration from `DASHSYNC_*` environment variables.
///
/// # Errors
/// Returns `DashSyncError::Config` if `DASHSYNC_STORAGE_BACKEND` is missing
/// or any variable has an invalid value.
pub fn load_from_env() -> Result<Config> {
    let mut config = Config::default();

    config.storage.backend = parse_backend(&env_var(ENV_STORAGE_BACKEND)?)?;
    if let Some(path) = env_opt("DASHSYNC_STORAGE_PATH") {
        config.storage.path = path;
    }

    if let Some(base_url) = env_opt("DASHSYNC_ANALYTICS_BASE_URL") {
        config.analytics.base_url = base_url;
    }
    config.analytics.api_token = env_opt("DASHSYNC_ANALYTICS_TOKEN");
    if let Some(timeout) = env_parse("DASHSYNC_ANALYTICS_TIMEOUT_SECS")? {
        config.analytics.timeout_seconds = timeout;
    }
    if let Some(attempts) = env_parse("DASHSYNC_ANALYTICS_MAX_ATTEMPTS")? {
        config.analytics.max_attempts = attempts;
    }

    if let Some(ttl) = env_parse("DASHSYNC_CACHE_TTL_SECS")? {
        config.cache.ttl_seconds = ttl;
    }
    if let Some(max_entries) = env_parse("DASHSYNC_CACHE_MAX_ENTRIES")? {
        config.cache.max_entries = max_entries;
    }

    if let Some(level) = env_opt("DASHSYNC_LOG_LEVEL") {
        config.logging.level = level;
    }
    config.logging.json = env_bool("DASHSYNC_LOG_JSON", config.logging.json);

    Ok(config)
}

/// Load configuration from a file.
///
/// If `path` is `None`, probes the standard locations.
///
/// # Errors
/// Returns `DashSyncError::Config` if the file is missing, unreadable or
/// malformed.
pub fn load_from_file(path: Option<PathBuf>) -> Result<Config> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(DashSyncError::Config(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            DashSyncError::Config("No config file found in any of the standard locations".into())
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| DashSyncError::Config(format!("Failed to read config file: {}", e)))?;

    parse_config(&contents, &config_path)
}

/// Parse configuration, choosing the format by file extension.
fn parse_config(contents: &str, path: &Path) -> Result<Config> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| DashSyncError::Config(format!("Invalid TOML format: {}", e))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| DashSyncError::Config(format!("Invalid JSON format: {}", e))),
        _ => Err(DashSyncError::Config(format!("Unsupported config format: {}", extension))),
    }
}

/// First existing config file in the working directory or next to the
/// executable.
pub fn probe_config_paths() -> Option<PathBuf> {
    let mut dirs = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        dirs.push(cwd);
    }
    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|p| p.parent().map(Path::to_path_buf))
    {
        dirs.push(exe_dir);
    }

    first_config_file(&dirs)
}

/// First known config file name present in `dirs`, searched in order.
fn first_config_file(dirs: &[PathBuf]) -> Option<PathBuf> {
    dirs.iter().flat_map(|dir| candidate_paths(dir)).find(|path| path.is_file())
}

fn candidate_paths(dir: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    CONFIG_FILE_NAMES.iter().map(move |name| dir.join(name))
}

fn parse_backend(value: &str) -> Result<StorageBackend> {
    match value.trim().to_ascii_lowercase().as_str() {
        "memory" => Ok(StorageBackend::Memory),
        "file" => Ok(StorageBackend::File),
        "unavailable" | "none" => Ok(StorageBackend::Unavailable),
        other => Err(DashSyncError::Config(format!("Invalid storage backend: {other}"))),
    }
}

/// Required environment variable.
fn env_var(key: &str) -> Result<String> {
    std::env::var(key).map_err(|_| {
        DashSyncError::Config(format!("Missing required environment variable: {}", key))
    })
}

/// Optional environment variable; blank counts as unset.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Optional numeric environment variable.
fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    env_opt(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| DashSyncError::Config(format!("Invalid value for {}: {}", key, e)))
        })
        .transpose()
}

/// Parse boolean from environment variable
///
/// Accepts: `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive)
fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
