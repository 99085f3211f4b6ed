//! Error types for the tcal engine.

use thiserror::Error;

/// Errors that can occur in tcal operations.
#[derive(Error, Debug)]
pub enum TCalError {
    #[error("Corrupted calendar file: {0}")]
    CorruptedFormat(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TCalError {
    pub(crate) fn corrupted(reason: impl Into<String>) -> Self {
        TCalError::CorruptedFormat(reason.into())
    }
}

/// Result type alias for tcal operations.
pub type TCalResult<T> = Result<T, TCalError>;
