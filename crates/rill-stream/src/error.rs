use rill_types::{Digest, StreamId};

/// Errors produced by the stream protocol core.
#[derive(Debug, thiserror::Error)]
pub enum StreamError {
    /// Object store failure.
    #[error(transparent)]
    Store(#[from] rill_store::StoreError),

    /// Head pointer storage failure.
    #[error(transparent)]
    Head(#[from] rill_heads::HeadError),

    /// Wire format failure.
    #[error(transparent)]
    Protocol(#[from] rill_protocol::ProtocolError),

    /// Transport failure.
    #[error(transparent)]
    Transport(#[from] rill_transport::TransportError),

    /// A `prev` digest could not be resolved (store miss, pruned history).
    #[error("broken chain: header {0} is not resolvable")]
    BrokenChain(Digest),

    /// A header's `data` blob is missing from the store.
    #[error("missing body: blob {data} for header {header}")]
    MissingBody { header: Digest, data: Digest },

    /// The delivery queue or sequencer worker has shut down.
    #[error("worker queue closed")]
    QueueClosed,

    /// The node already has a live subscription for this stream.
    #[error("stream {0} already has a live subscription")]
    AlreadySubscribed(StreamId),
}

/// Result alias for stream operations.
pub type StreamResult<T> = Result<T, StreamError>;
