//! Per-stream head pointers for Rill.
//!
//! A head pointer records, per stream, the most recent header the local
//! node has delivered (subscriber role) or produced (publisher role). The
//! two roles use the same [`HeadStore`] contract but should hold distinct
//! instances so a node subscribed to its own stream does not confuse
//! "last produced" with "last delivered".

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{HeadError, HeadResult};
pub use memory::InMemoryHeadStore;
pub use traits::HeadStore;
