//! DAG node model.
//!
//! A [`DagNode`] is a small metadata payload plus an ordered list of named
//! [`DagLink`]s to other stored objects. Stream headers are DAG nodes: a
//! `data` link to the message body blob and, for non-root headers, a `prev`
//! link to the previous header in the chain.

use serde::{Deserialize, Serialize};

use rill_types::Digest;

use crate::error::{StoreError, StoreResult};
use crate::hasher::ContentHasher;

/// A named edge from a DAG node to another stored object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagLink {
    /// Link name (e.g. "data", "prev").
    pub name: String,
    /// Digest of the linked object.
    pub target: Digest,
}

impl DagLink {
    /// Create a new named link.
    pub fn new(name: impl Into<String>, target: Digest) -> Self {
        Self {
            name: name.into(),
            target,
        }
    }
}

/// A node in the content-addressed DAG.
///
/// Nodes are immutable once stored; their digest is computed from the
/// canonical encoding of payload plus links.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DagNode {
    /// Small metadata payload (opaque to the store).
    pub payload: Vec<u8>,
    /// Ordered named links to other objects.
    pub links: Vec<DagLink>,
}

impl DagNode {
    /// Create an empty node (no payload, no links).
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a node with the given payload.
    pub fn with_payload(payload: Vec<u8>) -> Self {
        Self {
            payload,
            links: Vec::new(),
        }
    }

    /// Append a named link. Link order is part of the node's identity.
    pub fn add_link(&mut self, name: impl Into<String>, target: Digest) {
        self.links.push(DagLink::new(name, target));
    }

    /// Find a link by name. Returns the first match.
    pub fn link(&self, name: &str) -> Option<&DagLink> {
        self.links.iter().find(|l| l.name == name)
    }

    /// Canonical serialized bytes, the input to content hashing.
    pub fn canonical_bytes(&self) -> StoreResult<Vec<u8>> {
        bincode::serialize(self).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    /// Decode a node from its canonical bytes.
    pub fn from_canonical_bytes(digest: &Digest, bytes: &[u8]) -> StoreResult<Self> {
        bincode::deserialize(bytes).map_err(|e| StoreError::CorruptObject {
            digest: *digest,
            reason: e.to_string(),
        })
    }

    /// Compute the content-addressed digest for this node.
    pub fn compute_digest(&self) -> StoreResult<Digest> {
        Ok(ContentHasher::NODE.hash(&self.canonical_bytes()?))
    }
}
