//! Stream headers.
//!
//! A header is the decoded view of one DAG node in a stream's chain. Its
//! `data` link points at the message body blob; its `prev` link (absent on
//! the root) points at the previous header. The sequence number lives in
//! the node's payload and is assigned by the publisher (root = 0, then
//! previous + 1).

use serde::{Deserialize, Serialize};

use rill_store::{DagLink, DagNode};
use rill_types::Digest;

use crate::error::{ProtocolError, ProtocolResult};

/// Link name for the message body blob.
pub const LINK_DATA: &str = "data";
/// Link name for the previous header in the chain.
pub const LINK_PREV: &str = "prev";

/// Metadata embedded in a header node's payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderMeta {
    /// Per-stream monotonically increasing sequence number.
    pub seq: u64,
}

/// One header in a stream's append-only chain.
///
/// Immutable once stored. `digest` is the content address of the underlying
/// DAG node, computed by the store on put.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Content address of this header's node.
    pub digest: Digest,
    /// Per-stream sequence number (duplicate/staleness detection).
    pub seq: u64,
    /// Named links: `data` always, `prev` unless this is a root.
    pub links: Vec<DagLink>,
}

impl Header {
    /// Build the storable node for a new header.
    ///
    /// Root headers (`prev = None`) carry only the `data` link; every
    /// other header links both its body and the preceding header.
    pub fn node_for(seq: u64, data: Digest, prev: Option<Digest>) -> ProtocolResult<DagNode> {
        let payload = bincode::serialize(&HeaderMeta { seq })
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        let mut node = DagNode::with_payload(payload);
        node.add_link(LINK_DATA, data);
        if let Some(prev) = prev {
            node.add_link(LINK_PREV, prev);
        }
        Ok(node)
    }

    /// Decode a header from its stored node.
    ///
    /// Fails if the payload does not decode to [`HeaderMeta`] or the node
    /// has no `data` link.
    pub fn from_node(digest: Digest, node: &DagNode) -> ProtocolResult<Self> {
        let meta: HeaderMeta = bincode::deserialize(&node.payload)
            .map_err(|e| ProtocolError::Deserialization(e.to_string()))?;
        if node.link(LINK_DATA).is_none() {
            return Err(ProtocolError::MissingLink(LINK_DATA));
        }
        Ok(Self {
            digest,
            seq: meta.seq,
            links: node.links.clone(),
        })
    }

    /// Re-encode this header as a storable node.
    ///
    /// Round-trip stable with [`Header::from_node`]: the node's digest
    /// equals `self.digest` for headers decoded from the store.
    pub fn to_node(&self) -> ProtocolResult<DagNode> {
        let payload = bincode::serialize(&HeaderMeta { seq: self.seq })
            .map_err(|e| ProtocolError::Serialization(e.to_string()))?;
        Ok(DagNode {
            payload,
            links: self.links.clone(),
        })
    }

    /// Digest of the message body blob.
    pub fn data(&self) -> ProtocolResult<Digest> {
        self.links
            .iter()
            .find(|l| l.name == LINK_DATA)
            .map(|l| l.target)
            .ok_or(ProtocolError::MissingLink(LINK_DATA))
    }

    /// Digest of the previous header, or `None` for a root header.
    pub fn prev(&self) -> Option<Digest> {
        self.links
            .iter()
            .find(|l| l.name == LINK_PREV)
            .map(|l| l.target)
    }

    /// Returns `true` if this header has no `prev` link.
    pub fn is_root(&self) -> bool {
        self.prev().is_none()
    }

    /// Human-readable summary for logs.
    pub fn summary(&self) -> String {
        format!("seq={} ({})", self.seq, self.digest.short_hex())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_with(seq: u64, prev: Option<Digest>) -> DagNode {
        let payload = bincode::serialize(&HeaderMeta { seq }).unwrap();
        let mut node = DagNode::with_payload(payload);
        node.add_link(LINK_DATA, Digest::from_bytes(b"body"));
        if let Some(p) = prev {
            node.add_link(LINK_PREV, p);
        }
        node
    }

    #[test]
    fn decodes_root_header() {
        let node = node_with(0, None);
        let digest = node.compute_digest().unwrap();
        let header = Header::from_node(digest, &node).unwrap();

        assert_eq!(header.seq, 0);
        assert!(header.is_root());
        assert_eq!(header.data().unwrap(), Digest::from_bytes(b"body"));
    }

    #[test]
    fn decodes_chained_header() {
        let prev = Digest::from_bytes(b"previous header");
        let node = node_with(3, Some(prev));
        let header = Header::from_node(node.compute_digest().unwrap(), &node).unwrap();

        assert_eq!(header.seq, 3);
        assert_eq!(header.prev(), Some(prev));
        assert!(!header.is_root());
    }

    #[test]
    fn node_roundtrip_preserves_digest() {
        let node = node_with(7, Some(Digest::from_bytes(b"p")));
        let digest = node.compute_digest().unwrap();
        let header = Header::from_node(digest, &node).unwrap();

        let rebuilt = header.to_node().unwrap();
        assert_eq!(rebuilt, node);
        assert_eq!(rebuilt.compute_digest().unwrap(), digest);
    }

    #[test]
    fn rejects_node_without_data_link() {
        let payload = bincode::serialize(&HeaderMeta { seq: 1 }).unwrap();
        let node = DagNode::with_payload(payload);
        let err = Header::from_node(node.compute_digest().unwrap(), &node).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingLink(LINK_DATA)));
    }

    #[test]
    fn rejects_garbage_payload() {
        let mut node = DagNode::with_payload(vec![0xde, 0xad]);
        node.add_link(LINK_DATA, Digest::from_bytes(b"body"));
        let err = Header::from_node(node.compute_digest().unwrap(), &node).unwrap_err();
        assert!(matches!(err, ProtocolError::Deserialization(_)));
    }
}
