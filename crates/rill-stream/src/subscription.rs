//! Subscription: the header arrival and gap backfill protocol.
//!
//! A subscription owns one stream. Raw transport payloads are decoded into
//! headers, cached, and handed to a per-stream [`HeaderSequencer`] so two
//! arrivals never race on the head pointer. Accepted headers are resolved
//! to bodies through the [`DeliveryQueue`], which preserves the acceptance
//! order all the way to the application callback.
//!
//! The head pointer is advanced *before* a gap's backfill walk runs, so a
//! duplicate announcement arriving mid-recovery is rejected as stale. The
//! cost is a narrow window where a crash during backfill loses the
//! in-flight recovered range; Rill is a best-effort system and accepts
//! that.

use std::collections::VecDeque;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use rill_heads::HeadStore;
use rill_protocol::{codec, Header};
use rill_store::ObjectStore;
use rill_transport::Transport;
use rill_types::StreamId;

use crate::cache::HeaderCache;
use crate::config::SubscriptionConfig;
use crate::error::StreamResult;
use crate::resolver::{DeliveryHandler, DeliveryQueue};
use crate::sequencer::HeaderSequencer;

/// A live subscription to one stream.
///
/// Dropping a subscription stops its arrival task and lets the in-flight
/// workers wind down; [`Subscription::close`] additionally waits for
/// queued headers and deliveries to drain.
#[derive(Debug)]
pub struct Subscription {
    stream: StreamId,
    cache: Arc<HeaderCache>,
    // `None` only once `close` has taken them.
    sequencer: Option<HeaderSequencer>,
    queue: Option<DeliveryQueue>,
    arrival: Option<JoinHandle<()>>,
    // Liveness token: `StreamNode` holds a `Weak` to it to enforce one
    // live subscription per stream.
    liveness: Arc<()>,
}

/// State shared between the sequencer worker and the backfill walk.
struct SubscriptionWork {
    stream: StreamId,
    heads: Arc<dyn HeadStore>,
    cache: Arc<HeaderCache>,
    delivery: tokio::sync::mpsc::UnboundedSender<Header>,
    iteration_limit: usize,
}

impl Subscription {
    /// Create a subscription. Call [`Subscription::start`] to begin
    /// receiving announcements.
    ///
    /// `heads` must be the subscriber-side ("last delivered") head store;
    /// `cache` may be shared with other subscriptions.
    pub fn new(
        stream: StreamId,
        store: Arc<dyn ObjectStore>,
        heads: Arc<dyn HeadStore>,
        cache: Arc<HeaderCache>,
        handler: DeliveryHandler,
        config: SubscriptionConfig,
    ) -> Self {
        let queue = DeliveryQueue::new(stream.clone(), store, handler);
        let work = Arc::new(SubscriptionWork {
            stream: stream.clone(),
            heads,
            cache: Arc::clone(&cache),
            delivery: queue.sender(),
            iteration_limit: config.iteration_limit,
        });
        let sequencer = HeaderSequencer::new(move |header| {
            let work = Arc::clone(&work);
            async move { work.process_header(header).await }
        });
        Self {
            stream,
            cache,
            sequencer: Some(sequencer),
            queue: Some(queue),
            arrival: None,
            liveness: Arc::new(()),
        }
    }

    /// Subscribe to the stream's channel and start the arrival task.
    ///
    /// Idempotent: a second call on a started subscription is a no-op.
    pub fn start(&mut self, transport: &dyn Transport) -> StreamResult<()> {
        if self.arrival.is_some() {
            return Ok(());
        }
        let sequencer = match self.sequencer.as_ref() {
            Some(s) => s.sender(),
            // `close` consumes the subscription, so a closed one cannot
            // be restarted.
            None => return Ok(()),
        };
        let mut rx = transport.subscribe(&self.stream)?;
        let stream = self.stream.clone();
        let cache = Arc::clone(&self.cache);

        self.arrival = Some(tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(payload) => match codec::decode_announcement(&payload) {
                        Ok(header) => {
                            // Cache first so the backfill walk for this or a
                            // later header finds it without a store fetch.
                            cache.insert(header.clone());
                            if sequencer.send(header).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(stream = %stream, error = %e, "dropping malformed announcement");
                        }
                    },
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(stream = %stream, skipped, "transport receiver lagged; announcements lost");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        }));
        info!(stream = %self.stream, "subscription started");
        Ok(())
    }

    /// The stream this subscription follows.
    pub fn stream(&self) -> &StreamId {
        &self.stream
    }

    /// Shut down: stop accepting announcements, finish processing queued
    /// headers, drain pending deliveries.
    pub async fn close(mut self) {
        if let Some(arrival) = self.arrival.take() {
            arrival.abort();
            let _ = arrival.await;
        }
        if let Some(sequencer) = self.sequencer.take() {
            sequencer.close().await;
        }
        if let Some(queue) = self.queue.take() {
            queue.close().await;
        }
    }

    /// Token whose strong count tells whether this subscription is still
    /// alive.
    pub(crate) fn liveness(&self) -> &Arc<()> {
        &self.liveness
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        // Stop consuming announcements; the workers exit once their
        // channel senders are gone.
        if let Some(arrival) = self.arrival.take() {
            arrival.abort();
        }
    }
}

impl SubscriptionWork {
    /// Decide what a newly arrived header means: duplicate, first
    /// delivery, or a gap to recover. Runs serialized per stream.
    async fn process_header(&self, header: Header) {
        let last_delivered = match self.heads.head(&self.stream).await {
            Ok(last) => last,
            Err(e) => {
                warn!(stream = %self.stream, error = %e, "head read failed; dropping header");
                return;
            }
        };

        match last_delivered {
            // Duplicate or stale: already delivered this far.
            Some(last) if last.seq >= header.seq => {
                debug!(
                    stream = %self.stream,
                    header = %header.summary(),
                    head_seq = last.seq,
                    "discarding duplicate header"
                );
                self.cache.remove(&header.digest);
            }

            // First header ever seen for this stream: join live, no
            // history reconstruction.
            None => {
                if !self.advance_head(&header).await {
                    return;
                }
                debug!(stream = %self.stream, header = %header.summary(), "first delivery");
                self.submit(header);
            }

            // Gap: advance the head first so concurrent duplicates are
            // rejected while the walk below suspends on store reads.
            Some(last) => {
                if !self.advance_head(&header).await {
                    return;
                }
                let run = self.backfill(header, &last).await;
                debug!(
                    stream = %self.stream,
                    recovered = run.len(),
                    "delivering recovered run"
                );
                for h in run {
                    self.submit(h);
                }
            }
        }
    }

    /// Walk the `prev` chain from `newest` back toward `boundary`,
    /// collecting undelivered headers oldest→newest.
    ///
    /// The walk ends at the boundary (excluded; it was already delivered),
    /// at a root, at the iteration limit (lossy truncation under
    /// pathological chain lengths), or at an unresolvable link (pruned or
    /// abandoned history). Every early exit still delivers what was
    /// collected.
    async fn backfill(&self, newest: Header, boundary: &Header) -> Vec<Header> {
        let mut collected: VecDeque<Header> = VecDeque::new();
        let mut current = newest;
        loop {
            // Consumed: drop the arrival-path cache entry.
            self.cache.remove(&current.digest);

            if collected.len() > self.iteration_limit {
                warn!(
                    stream = %self.stream,
                    collected = collected.len(),
                    limit = self.iteration_limit,
                    "recovery truncated at iteration limit"
                );
                break;
            }
            if current.digest == boundary.digest {
                break;
            }

            collected.push_front(current.clone());

            let Some(prev) = current.prev() else {
                // Root reached without meeting the boundary: the boundary
                // was on an abandoned branch or has been pruned. End of
                // recoverable history.
                break;
            };
            match self.cache.resolve(&prev).await {
                Ok(header) => current = header,
                Err(e) => {
                    warn!(
                        stream = %self.stream,
                        prev = %prev,
                        error = %e,
                        "chain walk ended early; delivering partial run"
                    );
                    break;
                }
            }
        }
        collected.into()
    }

    /// Persist the new head. Returns `false` (and logs) on failure, in
    /// which case the header is dropped without delivery.
    async fn advance_head(&self, header: &Header) -> bool {
        if let Err(e) = self.heads.set_head(&self.stream, header).await {
            warn!(stream = %self.stream, error = %e, "head write failed; dropping header");
            return false;
        }
        true
    }

    fn submit(&self, header: Header) {
        if self.delivery.send(header).is_err() {
            warn!(stream = %self.stream, "delivery queue closed; dropping header");
        }
    }
}
