//! In-process transport for tests, embedding, and single-node deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::debug;

use rill_types::StreamId;

use crate::error::TransportResult;
use crate::traits::{PayloadReceiver, Transport};

/// Default capacity of per-channel broadcast buffers.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1024;

/// In-process fan-out transport.
///
/// One `tokio::sync::broadcast` sender per channel, created lazily on the
/// first publish or subscribe. Channels whose receivers have all gone away
/// are pruned lazily on publish.
pub struct LoopbackTransport {
    channels: RwLock<HashMap<StreamId, broadcast::Sender<Bytes>>>,
    capacity: usize,
}

impl LoopbackTransport {
    /// Create a transport with the default per-channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a transport with an explicit per-channel capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            capacity,
        }
    }

    /// Number of channels with live subscribers.
    pub fn active_channels(&self) -> usize {
        self.channels
            .read()
            .expect("lock poisoned")
            .values()
            .filter(|tx| tx.receiver_count() > 0)
            .count()
    }

    fn sender(&self, channel: &StreamId) -> broadcast::Sender<Bytes> {
        let mut map = self.channels.write().expect("lock poisoned");
        map.entry(channel.clone())
            .or_insert_with(|| broadcast::channel(self.capacity).0)
            .clone()
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for LoopbackTransport {
    async fn publish(&self, channel: &StreamId, payload: Bytes) -> TransportResult<()> {
        let delivered = {
            let mut map = self.channels.write().expect("lock poisoned");
            match map.get(channel) {
                // A send error means every receiver is gone; drop the
                // channel and treat the publish as a no-subscriber send.
                Some(tx) => match tx.send(payload) {
                    Ok(n) => n,
                    Err(_) => {
                        map.remove(channel);
                        0
                    }
                },
                None => 0,
            }
        };
        debug!(channel = %channel, receivers = delivered, "published payload");
        Ok(())
    }

    fn subscribe(&self, channel: &StreamId) -> TransportResult<PayloadReceiver> {
        Ok(self.sender(channel).subscribe())
    }
}
