//! Core error types for wellpulse-core.
//!
//! Errors are split by the layer that produces them. The metrics poller and
//! the timer config loader recover from [`ApiError`] locally; only programming
//! errors such as an empty phase sequence surface as hard failures.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for wellpulse-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// REST backend errors
    #[error("API error: {0}")]
    Api(#[from] ApiError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Key-value cache errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors talking to the metrics/pomodoro backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Network failure or non-2xx status
    #[error("Request to {url} failed: {message}")]
    FetchFailed { url: String, message: String },

    /// Body was not the JSON we expected
    #[error("Malformed response from {url}: {message}")]
    ParseFailed { url: String, message: String },
}

impl ApiError {
    pub fn fetch(url: impl Into<String>, message: impl ToString) -> Self {
        ApiError::FetchFailed {
            url: url.into(),
            message: message.to_string(),
        }
    }

    pub fn parse(url: impl Into<String>, message: impl ToString) -> Self {
        ApiError::ParseFailed {
            url: url.into(),
            message: message.to_string(),
        }
    }
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),

    /// Pomodoro config endpoint failed; callers fall back to cache or defaults
    #[error("Timer configuration unavailable: {0}")]
    ConfigUnavailable(#[source] ApiError),
}

/// Key-value cache errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the cache database
    #[error("Failed to open cache at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Cache database is locked
    #[error("Cache is locked")]
    Locked,
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Out of bounds
    #[error("Index {index} out of bounds for {collection} (length: {len})")]
    OutOfBounds {
        collection: String,
        index: usize,
        len: usize,
    },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Storage(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_error_display_names_url() {
        let err = ApiError::fetch("http://x/metrics/current", "HTTP 503");
        assert_eq!(
            err.to_string(),
            "Request to http://x/metrics/current failed: HTTP 503"
        );
    }

    #[test]
    fn config_unavailable_keeps_source() {
        let err = ConfigError::ConfigUnavailable(ApiError::parse("u", "eof"));
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Malformed response from u: eof"));
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::EmptyCollection("phases".into()).into();
        assert!(matches!(err, CoreError::Validation(_)));
    }
}
