//! Header cache.
//!
//! Maps header digests to decoded headers. The arrival path inserts every
//! announced header so the backfill walk finds it without a store
//! round-trip; the backfill path removes headers as it consumes them and
//! falls back to a store fetch on miss. A store fetch does NOT populate
//! the cache: insertion is owned by the arrival path.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tokio::sync::OnceCell;

use rill_protocol::Header;
use rill_store::ObjectStore;
use rill_types::Digest;

use crate::error::{StreamError, StreamResult};

/// Thread-safe header cache with fallback fetch from the object store.
///
/// Digests are globally unique, so one cache may be shared by any number
/// of subscriptions. The inner locks are never held across `.await`.
pub struct HeaderCache {
    store: Arc<dyn ObjectStore>,
    entries: Mutex<HashMap<Digest, Header>>,
    // Coalesces concurrent store fetches for the same missing digest.
    pending: Mutex<HashMap<Digest, Arc<OnceCell<Header>>>>,
}

impl HeaderCache {
    /// Create a cache backed by the given store for fallback fetches.
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self {
            store,
            entries: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Insert a header keyed by its digest.
    pub fn insert(&self, header: Header) {
        let mut map = self.entries.lock().expect("lock poisoned");
        map.insert(header.digest, header);
    }

    /// Look up a header without falling back to the store.
    pub fn get(&self, digest: &Digest) -> Option<Header> {
        let map = self.entries.lock().expect("lock poisoned");
        map.get(digest).cloned()
    }

    /// Remove a header. Returns it if it was cached.
    pub fn remove(&self, digest: &Digest) -> Option<Header> {
        let mut map = self.entries.lock().expect("lock poisoned");
        map.remove(digest)
    }

    /// Number of cached headers.
    pub fn len(&self) -> usize {
        self.entries.lock().expect("lock poisoned").len()
    }

    /// Returns `true` if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().expect("lock poisoned").is_empty()
    }

    /// Resolve a header: cache hit, or fetch-and-decode from the store.
    ///
    /// Concurrent resolves for the same missing digest share one store
    /// fetch. An unresolvable digest yields [`StreamError::BrokenChain`].
    pub async fn resolve(&self, digest: &Digest) -> StreamResult<Header> {
        if let Some(header) = self.get(digest) {
            return Ok(header);
        }

        let cell = {
            let mut pending = self.pending.lock().expect("lock poisoned");
            Arc::clone(pending.entry(*digest).or_default())
        };
        let result = cell
            .get_or_try_init(|| self.fetch(digest))
            .await
            .cloned();
        // Drop the pending slot once the fetch settles; a failed fetch is
        // retried by the next caller.
        self.pending.lock().expect("lock poisoned").remove(digest);
        result
    }

    async fn fetch(&self, digest: &Digest) -> StreamResult<Header> {
        let node = self
            .store
            .get_node(digest)
            .await?
            .ok_or(StreamError::BrokenChain(*digest))?;
        Ok(Header::from_node(*digest, &node)?)
    }
}

impl std::fmt::Debug for HeaderCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HeaderCache")
            .field("entry_count", &self.len())
            .finish()
    }
}
