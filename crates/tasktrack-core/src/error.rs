//! Core error types for tasktrack-core.
//!
//! Caller mistakes (bad view mode, missing title, unknown task) are kept
//! apart from store failures so a transport layer can map them to client
//! and server errors respectively.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for tasktrack-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Unrecognized productivity view selector
    #[error("Invalid view mode '{0}': expected one of daily, weekly, monthly")]
    InvalidViewMode(String),

    /// A required input field was absent or blank
    #[error("Missing required field: {0}")]
    MissingRequiredField(&'static str),

    /// Persisted streak weekday list could not be parsed
    #[error("Malformed streak days entry: '{0}'")]
    MalformedStreakDays(String),

    /// Timestamp could not be parsed
    #[error("Invalid timestamp '{0}': expected RFC 3339 or YYYY-MM-DD")]
    InvalidTimestamp(String),

    /// Task does not exist or has been soft-deleted
    #[error("Task not found: {0}")]
    TaskNotFound(String),

    /// Status change not permitted through an ordinary update
    #[error("Invalid status transition: {0}")]
    InvalidStatusTransition(String),

    /// Transaction, read or write failure against the store
    #[error("Store unavailable: {0}")]
    StoreUnavailable(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// In-process store lock was poisoned by a panicking writer
    #[error("Store lock poisoned")]
    Poisoned,
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

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked
                    || err.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::StoreUnavailable(err.into())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
