//! Core error types for solofit-core.
//!
//! Session commands fail with [`SessionError`] and leave the session
//! untouched. Store failures ([`StoreError`]) never abort a session; the
//! caller decides whether to retry a save.

use std::path::PathBuf;
use thiserror::Error;

use crate::session::PhaseKind;

/// Core error type for solofit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Session command rejected
    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    /// Profile store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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

/// A command the session could not apply. The session state is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The command is not valid in the current phase
    #[error("'{action}' is not allowed during {phase:?}")]
    NotAllowed {
        action: &'static str,
        phase: PhaseKind,
    },

    /// The command does not exist for this kind of session
    #[error("'{action}' is not supported by {mode} sessions")]
    Unsupported {
        action: &'static str,
        mode: &'static str,
    },

    /// Manual rep entry was not a non-negative integer
    #[error("Invalid rep count '{input}': expected a whole number of zero or more")]
    InvalidReps { input: String },

    /// The exercise requires a variant choice before it can start
    #[error("Choose a variant for '{exercise}' first ({options})")]
    VariantRequired { exercise: String, options: String },

    /// The variant is not offered by the exercise
    #[error("Unknown variant '{variant}' for '{exercise}'")]
    UnknownVariant { exercise: String, variant: String },

    /// Feedback was already captured for this session
    #[error("Feedback has already been recorded")]
    FeedbackAlreadyRecorded,
}

/// Errors raised by a profile store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// No profile exists yet
    #[error("No profile found")]
    ProfileNotFound,

    /// The backend refused the request
    #[error("Not authorized: {0}")]
    Unauthorized(String),

    /// The backend could not be reached or failed mid-request
    #[error("Transport error: {0}")]
    Transport(String),

    /// Local database failure
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Stored payload could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(#[from] serde_json::Error),
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

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be prepared
    #[error("Data directory unavailable: {0}")]
    DataDir(#[from] std::io::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Empty collection
    #[error("Empty collection: {0}")]
    EmptyCollection(String),

    /// Duplicate identifier
    #[error("Duplicate id '{0}'")]
    DuplicateId(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
