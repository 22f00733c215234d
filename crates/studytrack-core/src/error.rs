//! Core error types for studytrack-core.
//!
//! This module defines the error hierarchy using thiserror. Accounting and
//! dispatch errors are local to a single call and never abort the
//! observation stream.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for studytrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Accounting errors
    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),

    /// Alert dispatch errors
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    /// Alert sink errors
    #[error("Alert error: {0}")]
    Alert(#[from] AlertError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

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

/// Errors raised while accounting an observation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrackerError {
    /// The interval being closed has negative length (the clock went backwards).
    #[error("negative elapsed time of {elapsed_ms} ms; observations must not go back in time")]
    InvalidElapsed { elapsed_ms: i64 },
}

/// Errors raised by the alert dispatcher.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A previous alert is still being delivered.
    #[error("an alert dispatch is already running")]
    AlreadyRunning,

    /// The background worker could not be started.
    #[error("failed to spawn alert worker: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors raised by an alert sink while delivering an alert.
#[derive(Error, Debug)]
pub enum AlertError {
    #[error("alert output failed: {0}")]
    Io(#[from] std::io::Error),

    /// The external alert command exited unsuccessfully.
    #[error("alert command '{program}' exited with {status}")]
    CommandFailed { program: String, status: String },
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

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
