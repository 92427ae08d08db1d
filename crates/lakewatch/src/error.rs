//! Error types for lakewatch

use std::io;
use thiserror::Error;

/// Lakewatch error type
#[derive(Error, Debug)]
pub enum LakewatchError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid file filter '{pattern}': {source}")]
    Pattern {
        pattern: String,
        source: regex::Error,
    },

    /// A remote listing failed. Surfaced for the whole walk: a partial
    /// tree must never feed the watermark.
    #[error("Failed to obtain file listing for {path}: {source}")]
    Remote { path: String, source: io::Error },

    #[error("Remote path not found: {0}")]
    NotFound(String),

    #[error("Cursor persistence failed: {0}")]
    CursorPersistence(String),

    #[error("Downstream delivery failed: {0}")]
    Delivery(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, LakewatchError>;
