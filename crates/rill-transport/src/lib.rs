//! Best-effort pub/sub transport for Rill.
//!
//! The transport moves opaque byte payloads between publishers and
//! subscribers of a named channel. Delivery is at-most-once: payloads may
//! be lost (no subscribers, lagging receivers) and no ordering is promised
//! across channels. Everything stronger -- duplicate suppression, gap
//! recovery, ordered delivery -- is built above this layer by the
//! subscription protocol.

pub mod error;
pub mod loopback;
pub mod traits;

pub use error::{TransportError, TransportResult};
pub use loopback::LoopbackTransport;
pub use traits::{PayloadReceiver, Transport};
