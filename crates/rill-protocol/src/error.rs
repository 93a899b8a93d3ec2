use thiserror::Error;

/// Errors from encoding or decoding wire messages and headers.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("empty payload")]
    Empty,

    #[error("unknown message tag: {0}")]
    UnknownTag(u8),

    #[error("announcement too large: {size} bytes (max {max})")]
    TooLarge { size: usize, max: usize },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("deserialization error: {0}")]
    Deserialization(String),

    #[error("header is missing required link: {0}")]
    MissingLink(&'static str),
}

pub type ProtocolResult<T> = Result<T, ProtocolError>;
