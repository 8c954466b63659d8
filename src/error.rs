//! Error types shared by the store, the CLI and the HTTP API.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, RosterError>;

#[derive(Debug, Error)]
pub enum RosterError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no record with identity '{identity}'")]
    NotFound { identity: String },

    #[error(transparent)]
    Persistence(#[from] PersistenceError),
}

/// Rejected input. Nothing in the store changes when one of these is returned.
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("identity is required")]
    EmptyIdentity,

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("k must be at least 1")]
    ZeroNeighbors,
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read snapshot '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write snapshot '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot '{}' is malformed: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("snapshot key '{key}' does not match record identity '{identity}'")]
    KeyMismatch { key: String, identity: String },

    #[error("snapshot entry '{key}' is invalid: {source}")]
    InvalidEntry {
        key: String,
        #[source]
        source: ValidationError,
    },

    #[error("snapshot holds identity '{identity}' more than once")]
    DuplicateIdentity { identity: String },

    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
}
