//! Error types for head pointer operations.

use thiserror::Error;

/// Errors that can occur during head pointer operations.
#[derive(Debug, Error)]
pub enum HeadError {
    /// Serialization or deserialization failure in a durable backend.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from a durable backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is unavailable (shut down, disconnected).
    #[error("head store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for head pointer operations.
pub type HeadResult<T> = std::result::Result<T, HeadError>;
