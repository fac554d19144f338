//! Content hashing for Cairn.
//!
//! Provides domain-separated BLAKE3 hashing so that objects of different kinds
//! never share an id even when their serialized bytes are identical.
//!
//! Hashing is delegated to the `blake3` crate.

pub mod hasher;

pub use hasher::ContentHasher;
