//! Foundation types for Rill.
//!
//! This crate provides the identity types used throughout the Rill system.
//! Every other Rill crate depends on `rill-types`.
//!
//! # Key Types
//!
//! - [`Digest`] — Content-addressed identifier (BLAKE3 hash)
//! - [`StreamId`] — Validated name of an append-only message stream

pub mod digest;
pub mod error;
pub mod stream;

pub use digest::Digest;
pub use error::TypeError;
pub use stream::StreamId;
