use async_trait::async_trait;
use bytes::Bytes;

use rill_types::Digest;

use crate::error::StoreResult;
use crate::node::DagNode;

/// Content-addressed object store.
///
/// All implementations must satisfy these invariants:
/// - Objects are immutable once written. Content-addressing guarantees this:
///   the same data always produces the same digest.
/// - Writes are idempotent: re-writing existing content is a no-op.
/// - Concurrent reads are always safe (objects are immutable).
/// - No transactionality is promised across multiple puts.
/// - All I/O errors are propagated, never silently ignored.
///
/// Every operation may suspend (network or disk latency); callers must not
/// assume store calls are cheap.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store raw bytes as a blob and return its content-addressed digest.
    async fn put_blob(&self, data: &[u8]) -> StoreResult<Digest>;

    /// Read a blob by digest. Returns `Ok(None)` if it does not exist.
    async fn get_blob(&self, digest: &Digest) -> StoreResult<Option<Bytes>>;

    /// Store a DAG node and return its content-addressed digest.
    async fn put_node(&self, node: &DagNode) -> StoreResult<Digest>;

    /// Read a DAG node by digest. Returns `Ok(None)` if it does not exist.
    async fn get_node(&self, digest: &Digest) -> StoreResult<Option<DagNode>>;

    /// Check whether an object (blob or node) exists in the store.
    async fn exists(&self, digest: &Digest) -> StoreResult<bool>;
}
