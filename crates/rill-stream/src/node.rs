//! Node composition.
//!
//! A [`StreamNode`] wires one object store, one transport, one shared
//! header cache, and two head stores (producer side and subscriber side)
//! into a publish/subscribe surface. The split head stores keep "last
//! produced" and "last delivered" distinct, so a node subscribed to its
//! own stream processes its announcements like any other subscriber.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, Weak};

use rill_heads::{HeadStore, InMemoryHeadStore};
use rill_store::{InMemoryObjectStore, ObjectStore};
use rill_transport::{LoopbackTransport, Transport};
use rill_types::{Digest, StreamId};

use crate::cache::HeaderCache;
use crate::config::SubscriptionConfig;
use crate::error::{StreamError, StreamResult};
use crate::publisher::Publisher;
use crate::resolver::DeliveryHandler;
use crate::subscription::Subscription;

/// A Rill node: publish to and subscribe from any number of streams.
pub struct StreamNode {
    store: Arc<dyn ObjectStore>,
    transport: Arc<dyn Transport>,
    delivered: Arc<dyn HeadStore>,
    cache: Arc<HeaderCache>,
    publisher: Publisher,
    config: SubscriptionConfig,
    // One live subscription per stream: the delivered-head store and the
    // per-stream sequencer must not be shared by two arrival paths. Dead
    // entries (dropped or closed subscriptions) are overwritten lazily.
    subscribed: Mutex<HashMap<StreamId, Weak<()>>>,
}

impl StreamNode {
    /// Compose a node from explicit backends.
    pub fn new(
        store: Arc<dyn ObjectStore>,
        transport: Arc<dyn Transport>,
        produced: Arc<dyn HeadStore>,
        delivered: Arc<dyn HeadStore>,
        config: SubscriptionConfig,
    ) -> Self {
        let cache = Arc::new(HeaderCache::new(Arc::clone(&store)));
        let publisher = Publisher::new(Arc::clone(&store), produced, Arc::clone(&transport));
        Self {
            store,
            transport,
            delivered,
            cache,
            publisher,
            config,
            subscribed: Mutex::new(HashMap::new()),
        }
    }

    /// Fully in-memory node: `InMemoryObjectStore`, `LoopbackTransport`,
    /// in-memory head stores. For tests, embedding, and single-process use.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryObjectStore::new()),
            Arc::new(LoopbackTransport::new()),
            Arc::new(InMemoryHeadStore::new()),
            Arc::new(InMemoryHeadStore::new()),
            SubscriptionConfig::default(),
        )
    }

    /// Append `body` to `stream`; returns the new header's digest.
    pub async fn publish(&self, stream: &StreamId, body: &[u8]) -> StreamResult<Digest> {
        self.publisher.publish(stream, body).await
    }

    /// Subscribe to `stream`, delivering bodies to `handler` in causal
    /// order. The returned [`Subscription`] is live; drop or close it to
    /// stop.
    ///
    /// At most one live subscription per stream: the node's delivered-head
    /// store tracks one position per stream, so a second concurrent
    /// subscription is rejected with [`StreamError::AlreadySubscribed`].
    /// Once the first is dropped or closed the stream can be subscribed
    /// again. Independent consumers of the same stream need their own
    /// head store and cache (see [`Subscription::new`]).
    pub fn subscribe(
        &self,
        stream: StreamId,
        handler: DeliveryHandler,
    ) -> StreamResult<Subscription> {
        let mut active = self.subscribed.lock().expect("lock poisoned");
        if let Some(live) = active.get(&stream) {
            if live.strong_count() > 0 {
                return Err(StreamError::AlreadySubscribed(stream));
            }
        }
        let mut sub = Subscription::new(
            stream,
            Arc::clone(&self.store),
            Arc::clone(&self.delivered),
            Arc::clone(&self.cache),
            handler,
            self.config.clone(),
        );
        sub.start(self.transport.as_ref())?;
        active.insert(sub.stream().clone(), Arc::downgrade(sub.liveness()));
        Ok(sub)
    }

    /// The node's object store.
    pub fn store(&self) -> &Arc<dyn ObjectStore> {
        &self.store
    }

    /// The node's transport.
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::resolver::Delivery;

    fn collector() -> (DeliveryHandler, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: DeliveryHandler = Arc::new(move |d: Delivery| {
            sink.lock()
                .unwrap()
                .push(String::from_utf8_lossy(&d.body).into_owned());
        });
        (handler, seen)
    }

    async fn wait_for(seen: &Arc<Mutex<Vec<String>>>, expected: &[&str]) {
        for _ in 0..200 {
            if *seen.lock().unwrap() == expected {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(*seen.lock().unwrap(), expected, "delivery timeout");
    }

    #[tokio::test]
    async fn publish_then_subscribe_end_to_end() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("temps").unwrap();
        let (handler, seen) = collector();

        let _sub = node.subscribe(stream.clone(), handler).unwrap();

        node.publish(&stream, b"12.5").await.unwrap();
        node.publish(&stream, b"13.0").await.unwrap();
        node.publish(&stream, b"13.2").await.unwrap();

        wait_for(&seen, &["12.5", "13.0", "13.2"]).await;
    }

    #[tokio::test]
    async fn late_subscriber_joins_live() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("live").unwrap();

        // Published before anyone subscribed: gone for good.
        node.publish(&stream, b"missed").await.unwrap();

        let (handler, seen) = collector();
        let _sub = node.subscribe(stream.clone(), handler).unwrap();

        node.publish(&stream, b"second").await.unwrap();
        node.publish(&stream, b"third").await.unwrap();

        wait_for(&seen, &["second", "third"]).await;
    }

    #[tokio::test]
    async fn two_subscribers_both_receive() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("fanout").unwrap();
        let (handler_a, seen_a) = collector();
        let (handler_b, seen_b) = collector();

        let _sub_a = node.subscribe(stream.clone(), handler_a).unwrap();

        // The node rejects a second subscribe for the same stream; an
        // independent consumer brings its own delivered-head store (the
        // shared pointer would dedupe across subscribers) and cache.
        let mut sub_b = Subscription::new(
            stream.clone(),
            Arc::clone(node.store()),
            Arc::new(InMemoryHeadStore::new()),
            Arc::new(HeaderCache::new(Arc::clone(node.store()))),
            handler_b,
            SubscriptionConfig::default(),
        );
        sub_b.start(node.transport().as_ref()).unwrap();

        node.publish(&stream, b"both").await.unwrap();

        wait_for(&seen_a, &["both"]).await;
        wait_for(&seen_b, &["both"]).await;
        sub_b.close().await;
    }

    #[tokio::test]
    async fn second_subscribe_to_a_live_stream_is_rejected() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("guarded").unwrap();
        let (handler_a, _) = collector();
        let (handler_b, _) = collector();

        let _sub = node.subscribe(stream.clone(), handler_a).unwrap();
        let err = node.subscribe(stream.clone(), handler_b).unwrap_err();
        assert!(matches!(err, StreamError::AlreadySubscribed(s) if s == stream));
    }

    #[tokio::test]
    async fn closed_stream_can_be_subscribed_again() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("reopen").unwrap();
        let (handler_a, _) = collector();

        let sub = node.subscribe(stream.clone(), handler_a).unwrap();
        sub.close().await;

        let (handler_b, seen) = collector();
        let _sub = node.subscribe(stream.clone(), handler_b).unwrap();
        node.publish(&stream, b"after reopen").await.unwrap();
        wait_for(&seen, &["after reopen"]).await;
    }

    #[tokio::test]
    async fn dropped_subscription_frees_its_stream() {
        let node = StreamNode::in_memory();
        let stream = StreamId::new("drop-then-retry").unwrap();
        let (handler_a, _) = collector();

        drop(node.subscribe(stream.clone(), handler_a).unwrap());

        let (handler_b, _) = collector();
        assert!(node.subscribe(stream, handler_b).is_ok());
    }

    #[tokio::test]
    async fn distinct_streams_do_not_interfere() {
        let node = StreamNode::in_memory();
        let left = StreamId::new("left").unwrap();
        let right = StreamId::new("right").unwrap();
        let (handler, seen) = collector();

        let _sub = node.subscribe(left.clone(), handler).unwrap();

        node.publish(&right, b"other stream").await.unwrap();
        node.publish(&left, b"mine").await.unwrap();

        wait_for(&seen, &["mine"]).await;
    }
}
