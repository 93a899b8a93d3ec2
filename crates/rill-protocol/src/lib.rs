//! Wire format for Rill.
//!
//! A stream is an append-only chain of header nodes. Each [`Header`] links
//! to its message body (`data`) and, unless it is the chain root, to the
//! previous header (`prev`), and carries a per-stream sequence number for
//! duplicate detection. Header announcements travel over the pub/sub
//! transport encoded by the [`codec`] module; the full header is sent (not
//! just its digest) so receivers avoid a mandatory store round-trip.

pub mod codec;
pub mod error;
pub mod header;

pub use error::{ProtocolError, ProtocolResult};
pub use header::{Header, HeaderMeta, LINK_DATA, LINK_PREV};
