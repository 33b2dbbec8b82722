//! Error types for paceline.

use thiserror::Error;

/// Main error type for paceline operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error from reading passages, config or history files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// History database failure.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON encoding or decoding failure.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV export failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// Passage was empty after trimming.
    #[error("passage is empty")]
    EmptyPassage,

    /// Passage file exceeds the configured size limit.
    #[error("passage file is {size} bytes, limit is {limit} bytes")]
    PassageTooLarge { size: u64, limit: u64 },

    /// Passage file is not valid UTF-8 text.
    #[error("passage file is not valid UTF-8 text")]
    InvalidUtf8,

    /// No preset with the given name.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),

    /// Imported history payload was rejected.
    #[error("invalid history data: {message}")]
    InvalidHistory { message: String },

    /// Logging could not be initialized.
    #[error("logging error: {message}")]
    Logging { message: String },
}

/// Result type alias using paceline's Error.
pub type Result<T> = std::result::Result<T, Error>;
