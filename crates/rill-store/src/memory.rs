use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use bytes::Bytes;

use rill_types::Digest;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;
use crate::node::DagNode;
use crate::traits::ObjectStore;

/// In-memory, HashMap-based object store.
///
/// Intended for tests and embedding. All objects are held in memory behind
/// `RwLock`s for safe concurrent access. Blobs and nodes live in separate
/// maps since their digests are domain-separated.
pub struct InMemoryObjectStore {
    blobs: RwLock<HashMap<Digest, Bytes>>,
    nodes: RwLock<HashMap<Digest, DagNode>>,
}

impl InMemoryObjectStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            nodes: RwLock::new(HashMap::new()),
        }
    }

    /// Number of objects currently stored (blobs plus nodes).
    pub fn len(&self) -> usize {
        self.blobs.read().expect("lock poisoned").len()
            + self.nodes.read().expect("lock poisoned").len()
    }

    /// Returns `true` if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove all objects from the store.
    pub fn clear(&self) {
        self.blobs.write().expect("lock poisoned").clear();
        self.nodes.write().expect("lock poisoned").clear();
    }

    /// Remove a single object (blob or node). Returns `true` if it existed.
    ///
    /// Intended for retention/pruning simulation in tests. Deleting a node
    /// that other nodes still link to breaks those chains.
    pub fn remove(&self, digest: &Digest) -> bool {
        self.blobs.write().expect("lock poisoned").remove(digest).is_some()
            || self.nodes.write().expect("lock poisoned").remove(digest).is_some()
    }
}

impl Default for InMemoryObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for InMemoryObjectStore {
    async fn put_blob(&self, data: &[u8]) -> StoreResult<Digest> {
        let digest = ContentHasher::BLOB.hash(data);
        if digest.is_null() {
            return Err(StoreError::NullDigest);
        }
        let mut map = self.blobs.write().expect("lock poisoned");
        // Idempotent: content-addressing guarantees the same digest always
        // maps to the same content.
        map.entry(digest)
            .or_insert_with(|| Bytes::copy_from_slice(data));
        Ok(digest)
    }

    async fn get_blob(&self, digest: &Digest) -> StoreResult<Option<Bytes>> {
        let map = self.blobs.read().expect("lock poisoned");
        Ok(map.get(digest).cloned())
    }

    async fn put_node(&self, node: &DagNode) -> StoreResult<Digest> {
        let digest = node.compute_digest()?;
        if digest.is_null() {
            return Err(StoreError::NullDigest);
        }
        let mut map = self.nodes.write().expect("lock poisoned");
        map.entry(digest).or_insert_with(|| node.clone());
        Ok(digest)
    }

    async fn get_node(&self, digest: &Digest) -> StoreResult<Option<DagNode>> {
        let map = self.nodes.read().expect("lock poisoned");
        Ok(map.get(digest).cloned())
    }

    async fn exists(&self, digest: &Digest) -> StoreResult<bool> {
        if self.blobs.read().expect("lock poisoned").contains_key(digest) {
            return Ok(true);
        }
        Ok(self.nodes.read().expect("lock poisoned").contains_key(digest))
    }
}

impl std::fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryObjectStore")
            .field("object_count", &self.len())
            .finish()
    }
}
