//! Stream protocol core for Rill.
//!
//! An append-only, causally-ordered message stream layered on a
//! content-addressed object store and a best-effort pub/sub transport.
//! Publishers append data by linking each new header to its body and to the
//! previous header; subscribers receive header announcements, suppress
//! duplicates, backfill gaps by walking the `prev` chain, and deliver
//! message bodies to the application callback in causal order even though
//! announcements and body lookups are individually unordered.
//!
//! # Components
//!
//! - [`HeaderCache`] — header-by-digest cache with fallback store fetch
//! - [`DeliveryQueue`] — single-worker FIFO body resolution and callback
//! - [`HeaderSequencer`] — per-stream serialization of header processing
//! - [`Subscription`] — arrival handling, duplicate detection, gap backfill
//! - [`Publisher`] — head-chain construction and announcement broadcast
//! - [`StreamNode`] — composition façade wiring the above together

pub mod cache;
pub mod config;
pub mod error;
pub mod node;
pub mod publisher;
pub mod resolver;
pub mod sequencer;
pub mod subscription;

pub use cache::HeaderCache;
pub use config::SubscriptionConfig;
pub use error::{StreamError, StreamResult};
pub use node::StreamNode;
pub use publisher::Publisher;
pub use resolver::{Delivery, DeliveryHandler, DeliveryQueue};
pub use sequencer::HeaderSequencer;
pub use subscription::Subscription;
