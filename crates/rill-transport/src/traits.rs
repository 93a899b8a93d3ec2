use async_trait::async_trait;
use bytes::Bytes;
use tokio::sync::broadcast;

use rill_types::StreamId;

use crate::error::TransportResult;

/// Receiver half of a channel subscription.
///
/// Built on `tokio::sync::broadcast`: a receiver that falls behind the
/// channel capacity observes `RecvError::Lagged` and loses the skipped
/// payloads. Consumers treat lag as message loss, matching the at-most-once
/// transport contract.
pub type PayloadReceiver = broadcast::Receiver<Bytes>;

/// Best-effort pub/sub transport.
///
/// - `publish` delivers the payload to every *currently* subscribed
///   receiver of the channel. Zero subscribers is success, not an error.
/// - `subscribe` registers a new receiver; payloads published before the
///   subscription are never replayed.
/// - No ordering is promised across channels; within a channel payloads
///   arrive in publish order but may be dropped under lag.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Broadcast a payload on the named channel.
    async fn publish(&self, channel: &StreamId, payload: Bytes) -> TransportResult<()>;

    /// Subscribe to the named channel.
    fn subscribe(&self, channel: &StreamId) -> TransportResult<PayloadReceiver>;
}
