//! Core error types for pomolight-core.
//!
//! Every error in this crate is recoverable: meeting input errors are shown
//! to the user and the prompt is retried, persistence errors fall back to
//! defaults or keep the in-memory state, and light errors turn effects into
//! no-ops. Only the user-initiated `exit` phase ends the process.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for pomolight-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Meeting input validation errors
    #[error("Meeting input error: {0}")]
    Meeting(#[from] MeetingInputError),

    /// State file errors
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    /// Notification light errors
    #[error("Light error: {0}")]
    Light(#[from] LightError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A command that has no transition from the current phase
    #[error("'{command}' is not available while {phase}")]
    IllegalCommand { command: String, phase: String },

    /// Input that names no command
    #[error("unknown command: '{0}'")]
    UnknownCommand(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejections for a meeting typed as `HHMM`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MeetingInputError {
    #[error("'{0}' is not a time in HHMM format")]
    InvalidFormat(String),

    #[error("hour {0} is outside 00-23")]
    InvalidHour(u32),

    #[error("minute {0} is outside 00-59")]
    InvalidMinute(u32),

    #[error("{hour:02}:{minute:02} has already passed today")]
    InThePast { hour: u32, minute: u32 },
}

/// State file errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PersistenceError {
    /// The state file exists but could not be read or parsed
    #[error("Failed to read state from {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// The state could not be written
    #[error("Failed to write state to {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Notification light errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LightError {
    /// The device (or the program driving it) did not respond
    #[error("Light device disconnected: {0}")]
    DeviceDisconnected(String),
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

    /// Key not present in the configuration
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_the_past_message_is_zero_padded() {
        let err = MeetingInputError::InThePast { hour: 8, minute: 5 };
        assert_eq!(err.to_string(), "08:05 has already passed today");
    }

    #[test]
    fn meeting_error_converts_into_core_error() {
        let err: CoreError = MeetingInputError::InvalidHour(25).into();
        assert!(matches!(err, CoreError::Meeting(MeetingInputError::InvalidHour(25))));
        assert!(err.to_string().contains("hour 25"));
    }
}
