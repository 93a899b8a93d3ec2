//! Per-stream header processing serialization.
//!
//! Header announcements for one stream may arrive while an earlier one is
//! still being processed (a backfill walk suspends repeatedly on store
//! reads). The [`HeaderSequencer`] accepts headers as they arrive and runs
//! the processing function one at a time, in arrival order, so two headers
//! for the same stream never race on the head pointer.

use std::future::Future;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use rill_protocol::Header;

use crate::error::{StreamError, StreamResult};

/// Single-concurrency worker: one queued processing run at a time, in
/// submission order.
#[derive(Debug)]
pub struct HeaderSequencer {
    tx: mpsc::UnboundedSender<Header>,
    worker: JoinHandle<()>,
}

impl HeaderSequencer {
    /// Spawn a sequencer around an async processing function.
    ///
    /// Each header's `process` future runs to completion before the next
    /// header is taken off the queue.
    pub fn new<F, Fut>(process: F) -> Self
    where
        F: Fn(Header) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Header>();
        let worker = tokio::spawn(async move {
            while let Some(header) = rx.recv().await {
                process(header).await;
            }
        });
        Self { tx, worker }
    }

    /// Queue a header for processing.
    pub fn submit(&self, header: Header) -> StreamResult<()> {
        self.tx.send(header).map_err(|_| StreamError::QueueClosed)
    }

    /// A cloneable submission handle for the arrival task.
    pub(crate) fn sender(&self) -> mpsc::UnboundedSender<Header> {
        self.tx.clone()
    }

    /// Shut down: drain queued headers, then wait for the worker.
    pub async fn close(self) {
        drop(self.tx);
        let _ = self.worker.await;
    }
}
