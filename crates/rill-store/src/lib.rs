//! Content-addressed object storage for Rill.
//!
//! This crate implements a hash-keyed object store. Every piece of data in
//! Rill -- message bodies and the header nodes that link them -- is stored
//! as an immutable object identified by its BLAKE3 hash (domain-separated
//! by object kind).
//!
//! # Object Types
//!
//! - blobs -- raw content (message bodies, arbitrary data)
//! - [`DagNode`] -- a small payload plus named [`DagLink`]s to other objects
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Writes are idempotent: the same content always produces the same digest.
//! 3. Concurrent reads are always safe (objects are immutable).
//! 4. The store never interprets object contents beyond the blob/node split.
//! 5. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod hasher;
pub mod memory;
pub mod node;
pub mod traits;

pub use error::{StoreError, StoreResult};
pub use hasher::ContentHasher;
pub use memory::InMemoryObjectStore;
pub use node::{DagLink, DagNode};
pub use traits::ObjectStore;
