//! Ordered body resolution.
//!
//! Body lookups are asynchronous with variable latency, but the user
//! callback must observe bodies in the order headers were accepted. The
//! [`DeliveryQueue`] guarantees that structurally: a single worker executes
//! one unit of work at a time, in submission order, and only starts a unit
//! after the previous unit's callback has returned. No sequence numbers
//! are compared here; ordering is the queue discipline itself.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

use rill_protocol::Header;
use rill_store::ObjectStore;
use rill_types::{Digest, StreamId};

use crate::error::{StreamError, StreamResult};

/// A message body handed to the application callback.
#[derive(Clone, Debug)]
pub struct Delivery {
    /// The stream this message belongs to.
    pub stream: StreamId,
    /// Sequence number of the message's header.
    pub seq: u64,
    /// Digest of the message's header.
    pub header: Digest,
    /// The message body.
    pub body: Bytes,
}

/// Application callback invoked once per successfully resolved body.
pub type DeliveryHandler = Arc<dyn Fn(Delivery) + Send + Sync>;

/// FIFO queue resolving headers to bodies and invoking the user callback.
///
/// A failed unit (missing data link, store error, missing blob) is logged
/// and skipped; subsequent units still run in submission order, so one bad
/// header never wedges or reorders the queue.
#[derive(Debug)]
pub struct DeliveryQueue {
    tx: mpsc::UnboundedSender<Header>,
    worker: JoinHandle<()>,
}

impl DeliveryQueue {
    /// Create a queue for one stream and spawn its worker.
    pub fn new(stream: StreamId, store: Arc<dyn ObjectStore>, handler: DeliveryHandler) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<Header>();
        let worker = tokio::spawn(async move {
            // One unit in flight at a time; this loop is the entire
            // ordering mechanism.
            while let Some(header) = rx.recv().await {
                if let Err(e) = fetch_and_deliver(&stream, &*store, &*handler, &header).await {
                    warn!(
                        stream = %stream,
                        header = %header.summary(),
                        error = %e,
                        "body delivery failed; skipping unit"
                    );
                }
            }
        });
        Self { tx, worker }
    }

    /// Enqueue a header for body resolution and delivery.
    pub fn submit(&self, header: Header) -> StreamResult<()> {
        self.tx.send(header).map_err(|_| StreamError::QueueClosed)
    }

    /// A cloneable submission handle for the processing path.
    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Header> {
        self.tx.clone()
    }

    /// Shut down: stop accepting work, drain queued units, wait for the
    /// worker to finish.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}

async fn fetch_and_deliver(
    stream: &StreamId,
    store: &dyn ObjectStore,
    handler: &(dyn Fn(Delivery) + Send + Sync),
    header: &Header,
) -> StreamResult<()> {
    let data = header.data()?;
    let body = store
        .get_blob(&data)
        .await?
        .ok_or(StreamError::MissingBody {
            header: header.digest,
            data,
        })?;
    handler(Delivery {
        stream: stream.clone(),
        seq: header.seq,
        header: header.digest,
        body,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use async_trait::async_trait;
    use rill_store::{DagNode, InMemoryObjectStore, StoreResult};

    /// Store wrapper that delays blob reads for chosen digests, simulating
    /// skewed network latency.
    struct SlowStore {
        inner: InMemoryObjectStore,
        delays: Mutex<HashMap<Digest, Duration>>,
    }

    impl SlowStore {
        fn new() -> Self {
            Self {
                inner: InMemoryObjectStore::new(),
                delays: Mutex::new(HashMap::new()),
            }
        }

        fn delay(&self, digest: Digest, by: Duration) {
            self.delays.lock().unwrap().insert(digest, by);
        }
    }

    #[async_trait]
    impl ObjectStore for SlowStore {
        async fn put_blob(&self, data: &[u8]) -> StoreResult<Digest> {
            self.inner.put_blob(data).await
        }

        async fn get_blob(&self, digest: &Digest) -> StoreResult<Option<Bytes>> {
            let delay = self.delays.lock().unwrap().get(digest).copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            self.inner.get_blob(digest).await
        }

        async fn put_node(&self, node: &DagNode) -> StoreResult<Digest> {
            self.inner.put_node(node).await
        }

        async fn get_node(&self, digest: &Digest) -> StoreResult<Option<DagNode>> {
            self.inner.get_node(digest).await
        }

        async fn exists(&self, digest: &Digest) -> StoreResult<bool> {
            self.inner.exists(digest).await
        }
    }

    fn collector() -> (DeliveryHandler, Arc<Mutex<Vec<u64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: DeliveryHandler = Arc::new(move |d: Delivery| {
            sink.lock().unwrap().push(d.seq);
        });
        (handler, seen)
    }

    async fn header_for(store: &dyn ObjectStore, seq: u64, body: &[u8]) -> Header {
        let data = store.put_blob(body).await.unwrap();
        let node = Header::node_for(seq, data, None).unwrap();
        let digest = store.put_node(&node).await.unwrap();
        Header::from_node(digest, &node).unwrap()
    }

    // -----------------------------------------------------------------------
    // FIFO ordering
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn delivers_in_submission_order_under_skewed_latency() {
        let store = Arc::new(SlowStore::new());
        let h1 = header_for(&*store, 1, b"first").await;
        let h2 = header_for(&*store, 2, b"second").await;
        let h3 = header_for(&*store, 3, b"third").await;

        // The first body is the slowest; FIFO must hold anyway.
        store.delay(h1.data().unwrap(), Duration::from_millis(80));
        store.delay(h2.data().unwrap(), Duration::from_millis(5));

        let (handler, seen) = collector();
        let stream = StreamId::new("latency").unwrap();
        let queue = DeliveryQueue::new(stream, store, handler);

        queue.submit(h1).unwrap();
        queue.submit(h2).unwrap();
        queue.submit(h3).unwrap();
        queue.close().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn delivers_body_bytes() {
        let store = Arc::new(InMemoryObjectStore::new());
        let header = header_for(&*store, 0, b"hello stream").await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler: DeliveryHandler = Arc::new(move |d: Delivery| {
            sink.lock().unwrap().push(d.body.to_vec());
        });

        let queue = DeliveryQueue::new(StreamId::new("bytes").unwrap(), store, handler);
        queue.submit(header).unwrap();
        queue.close().await;

        assert_eq!(*seen.lock().unwrap(), vec![b"hello stream".to_vec()]);
    }

    // -----------------------------------------------------------------------
    // Failure isolation
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn failed_unit_does_not_block_later_units() {
        let store = Arc::new(InMemoryObjectStore::new());
        let good_before = header_for(&*store, 1, b"before").await;
        let good_after = header_for(&*store, 3, b"after").await;

        // A header whose body blob was never stored.
        let node = Header::node_for(2, Digest::from_bytes(b"nowhere"), None).unwrap();
        let bad_digest = store.put_node(&node).await.unwrap();
        let bad = Header::from_node(bad_digest, &node).unwrap();

        let (handler, seen) = collector();
        let queue = DeliveryQueue::new(StreamId::new("faulty").unwrap(), store, handler);

        queue.submit(good_before).unwrap();
        queue.submit(bad).unwrap();
        queue.submit(good_after).unwrap();
        queue.close().await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 3]);
    }

    #[tokio::test]
    async fn submit_after_close_fails() {
        let store: Arc<dyn ObjectStore> = Arc::new(InMemoryObjectStore::new());
        let header = header_for(&*store, 0, b"x").await;

        let (handler, _) = collector();
        let queue = DeliveryQueue::new(StreamId::new("closed").unwrap(), store, handler);
        let submit_tx = queue.tx.clone();
        queue.close().await;

        assert!(submit_tx.send(header).is_err());
    }
}
