//! Core error types for pomocycle-core.
//!
//! Errors are grouped by the layer that raises them: history storage,
//! user configuration, and input validation. Recoverable conditions (a corrupt
//! history file, a missing notification backend) never surface here; they are
//! logged and handled where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomocycle-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// History storage errors
    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

/// History storage errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Writing the history file failed. The previous file is left untouched.
    #[error("Failed to write history to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The in-memory history could not be serialized
    #[error("Failed to serialize history: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The data directory could not be resolved or created
    #[error("Cannot prepare data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    /// Long break outside the accepted range
    #[error("Long break duration must be between {min}-{max} minutes (got {minutes})")]
    LongBreakOutOfRange { minutes: u32, min: u32, max: u32 },

    /// A persisted history entry is missing fields or has the wrong types
    #[error("History entry #{index} is malformed: {message}")]
    MalformedRecord { index: usize, message: String },

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::ParseFailed(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn long_break_message_names_the_range() {
        let err = ValidationError::LongBreakOutOfRange {
            minutes: 40,
            min: 15,
            max: 30,
        };
        assert_eq!(
            err.to_string(),
            "Long break duration must be between 15-30 minutes (got 40)"
        );
    }

    #[test]
    fn validation_converts_into_core_error() {
        let err: CoreError = ValidationError::MalformedRecord {
            index: 2,
            message: "missing field `work_sessions`".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Validation(_)));
        assert!(err.to_string().contains("#2"));
    }

    #[test]
    fn bad_config_converts_into_core_error() {
        let parse: ConfigError = toml::from_str::<toml::Value>("x = [").unwrap_err().into();
        let err: CoreError = parse.into();
        assert!(matches!(err, CoreError::Config(ConfigError::ParseFailed(_))));
        assert!(err.to_string().starts_with("Configuration error: Failed to parse"));
    }
}
