//! Stream identifiers.
//!
//! A [`StreamId`] names one append-only message stream and doubles as the
//! pub/sub channel name the stream's header announcements travel on.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Maximum length of a stream id in bytes.
pub const MAX_STREAM_ID_LEN: usize = 256;

/// Validated name of an append-only message stream.
///
/// Stream ids must be non-empty, at most [`MAX_STREAM_ID_LEN`] bytes, and
/// free of NUL and other control characters (they are used verbatim as
/// transport channel names).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StreamId(String);

impl StreamId {
    /// Create a validated stream id.
    pub fn new(name: impl Into<String>) -> Result<Self, TypeError> {
        let name = name.into();
        if name.is_empty() {
            return Err(TypeError::InvalidStreamId {
                reason: "stream id must not be empty".into(),
            });
        }
        if name.len() > MAX_STREAM_ID_LEN {
            return Err(TypeError::InvalidStreamId {
                reason: format!("stream id exceeds {MAX_STREAM_ID_LEN} bytes"),
            });
        }
        if name.chars().any(|c| c.is_control()) {
            return Err(TypeError::InvalidStreamId {
                reason: "stream id must not contain control characters".into(),
            });
        }
        Ok(Self(name))
    }

    /// The stream id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StreamId({})", self.0)
    }
}

impl fmt::Display for StreamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for StreamId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
