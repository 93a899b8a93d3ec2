//! In-memory head pointer store for testing and ephemeral use.
//!
//! [`InMemoryHeadStore`] keeps all head pointers in a `HashMap` protected
//! by an `RwLock`. Data is lost when the store is dropped; durable
//! deployments back this trait with persistent storage instead.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use rill_protocol::Header;
use rill_types::StreamId;

use crate::error::HeadResult;
use crate::traits::HeadStore;

/// An in-memory implementation of [`HeadStore`].
#[derive(Debug, Default)]
pub struct InMemoryHeadStore {
    heads: RwLock<HashMap<StreamId, Header>>,
}

impl InMemoryHeadStore {
    /// Create a new empty head store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of streams with a recorded head.
    pub fn len(&self) -> usize {
        self.heads.read().expect("lock poisoned").len()
    }

    /// Returns `true` if no stream has a recorded head.
    pub fn is_empty(&self) -> bool {
        self.heads.read().expect("lock poisoned").is_empty()
    }
}

#[async_trait]
impl HeadStore for InMemoryHeadStore {
    async fn head(&self, stream: &StreamId) -> HeadResult<Option<Header>> {
        let map = self.heads.read().expect("lock poisoned");
        Ok(map.get(stream).cloned())
    }

    async fn set_head(&self, stream: &StreamId, header: &Header) -> HeadResult<()> {
        let mut map = self.heads.write().expect("lock poisoned");
        map.insert(stream.clone(), header.clone());
        Ok(())
    }
}
