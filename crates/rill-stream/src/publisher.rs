//! Publishing: head-chain construction and announcement broadcast.
//!
//! Each publish stores the body blob, builds a header node linking the
//! body (and the previous head, for non-root writes), stores it, announces
//! the new head on the stream's channel, and records it as the local
//! "last produced" head. A crash after the node is stored but before the
//! announcement leaves a durable, never-observed header; it is not rolled
//! back.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, info};

use rill_heads::HeadStore;
use rill_protocol::{codec, Header};
use rill_store::ObjectStore;
use rill_transport::Transport;
use rill_types::{Digest, StreamId};

use crate::error::StreamResult;

/// Appends new messages to streams this node writes.
///
/// `heads` must be the producer-side ("last produced") head store, kept
/// separate from any subscriber-side store so a node following its own
/// stream still observes its announcements like any other subscriber.
pub struct Publisher {
    store: Arc<dyn ObjectStore>,
    heads: Arc<dyn HeadStore>,
    transport: Arc<dyn Transport>,
}

impl Publisher {
    /// Create a publisher over the given store, head store, and transport.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        heads: Arc<dyn HeadStore>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            store,
            heads,
            transport,
        }
    }

    /// Append `body` to `stream` and broadcast the new head.
    ///
    /// Returns the digest of the new header. The first publish for a
    /// stream creates its root header (`seq = 0`, no `prev` link); every
    /// later publish chains onto the previous head with `seq + 1`.
    pub async fn publish(&self, stream: &StreamId, body: &[u8]) -> StreamResult<Digest> {
        let data = self.store.put_blob(body).await?;

        let prev_head = self.heads.head(stream).await?;
        let (seq, prev) = match &prev_head {
            Some(prev) => (prev.seq + 1, Some(prev.digest)),
            None => (0, None),
        };
        if prev.is_none() {
            debug!(stream = %stream, "publishing root header");
        }

        let node = Header::node_for(seq, data, prev)?;
        let digest = self.store.put_node(&node).await?;
        let header = Header::from_node(digest, &node)?;

        let payload = codec::encode_announcement(&header)?;
        self.transport.publish(stream, Bytes::from(payload)).await?;
        self.heads.set_head(stream, &header).await?;

        info!(stream = %stream, header = %header.summary(), "published");
        Ok(digest)
    }
}
