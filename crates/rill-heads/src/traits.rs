//! The [`HeadStore`] trait defining the head pointer storage interface.

use async_trait::async_trait;

use rill_protocol::Header;
use rill_types::StreamId;

use crate::error::HeadResult;

/// Storage backend for per-stream head pointers.
///
/// Implementations must be thread-safe (`Send + Sync`). A head pointer is
/// only ever advanced by its owning role's serialized processing path, so
/// no compare-and-swap is required here; the contract is a plain get/set
/// per stream. The full header is stored (not just its digest) so the
/// owner can compare sequence numbers without a store lookup.
#[async_trait]
pub trait HeadStore: Send + Sync {
    /// Read the head for a stream.
    ///
    /// Returns `Ok(None)` if no head has ever been set for the stream.
    async fn head(&self, stream: &StreamId) -> HeadResult<Option<Header>>;

    /// Set (create or advance) the head for a stream.
    async fn set_head(&self, stream: &StreamId, header: &Header) -> HeadResult<()>;
}
