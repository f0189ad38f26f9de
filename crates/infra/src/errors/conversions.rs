//! Conversions from external infrastructure errors into domain errors.

use std::io::{Error as IoError, ErrorKind};

use dashsync_domain::DashSyncError;
use reqwest::{Error as HttpError, StatusCode};
use toml::de::Error as TomlError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub DashSyncError);

impl From<InfraError> for DashSyncError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<DashSyncError> for InfraError {
    fn from(value: DashSyncError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoDashSyncError {
    fn into_dashsync(self) -> DashSyncError;
}

/// Domain error for a non-success HTTP status.
pub(crate) fn status_error(status: StatusCode, message: String) -> DashSyncError {
    match status.as_u16() {
        401 | 403 => DashSyncError::Config(format!("credentials rejected: {message}")),
        404 => DashSyncError::NotFound(message),
        429 => DashSyncError::Network(message),
        400..=499 => DashSyncError::Validation(message),
        _ => DashSyncError::Network(message),
    }
}

/* -------------------------------------------------------------------------- */
/* std::io::Error → DashSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDashSyncError for IoError {
    fn into_dashsync(self) -> DashSyncError {
        match self.kind() {
            ErrorKind::NotFound => DashSyncError::NotFound(self.to_string()),
            ErrorKind::PermissionDenied => {
                DashSyncError::Storage(format!("permission denied: {self}"))
            }
            ErrorKind::InvalidData => DashSyncError::Serialization(self.to_string()),
            _ => DashSyncError::Storage(self.to_string()),
        }
    }
}

impl From<IoError> for InfraError {
    fn from(value: IoError) -> Self {
        InfraError(value.into_dashsync())
    }
}

/* -------------------------------------------------------------------------- */
/* toml::de::Error → DashSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDashSyncError for TomlError {
    fn into_dashsync(self) -> DashSyncError {
        DashSyncError::Serialization(format!("invalid TOML: {self}"))
    }
}

impl From<TomlError> for InfraError {
    fn from(value: TomlError) -> Self {
        InfraError(value.into_dashsync())
    }
}

/* -------------------------------------------------------------------------- */
/* serde_json::Error → DashSyncError */
/* -------------------------------------------------------------------------- */

impl From<serde_json::Error> for InfraError {
    fn from(value: serde_json::Error) -> Self {
        InfraError(DashSyncError::from(value))
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → DashSyncError */
/* -------------------------------------------------------------------------- */

impl IntoDashSyncError for HttpError {
    fn into_dashsync(self) -> DashSyncError {
        if self.is_timeout() {
            return DashSyncError::Network("HTTP request timed out".into());
        }

        #[cfg(not(target_arch = "wasm32"))]
        if self.is_connect() {
            return DashSyncError::Network("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let message = format!(
                "HTTP {} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or("unknown status")
            );
            return status_error(status, message);
        }

        if self.is_decode() {
            return DashSyncError::Serialization(self.to_string());
        }

        DashSyncError::Network(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_dashsync())
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
