use thiserror::Error;

/// Errors from transport operations.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The transport has been shut down and no longer accepts traffic.
    #[error("transport is shut down")]
    Shutdown,

    /// The payload exceeds the transport's size limit.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// I/O error from a networked backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;
