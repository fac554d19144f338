//! Content-addressed object storage for Cairn.
//!
//! Every object (blob, tree, commit, tag) is stored immutably under the
//! BLAKE3 hash of its kind and serialized content.
//!
//! # Object Types
//!
//! - [`Blob`] -- raw content (file contents, arbitrary data)
//! - [`Tree`] -- one directory level, entries in canonical order
//! - [`Commit`] -- root tree plus parent links
//! - [`Tag`] -- annotated pointer to another object
//!
//! # Storage Backends
//!
//! All backends implement the [`ObjectStore`] trait:
//!
//! - [`InMemoryObjectStore`] -- `HashMap`-based store for tests and embedding
//! - [`LooseObjectStore`] -- one zstd-compressed file per object on disk
//!
//! # Design Rules
//!
//! 1. Objects are immutable once written (content-addressing guarantees this).
//! 2. Concurrent reads are always safe (objects are immutable).
//! 3. The store never interprets object contents -- it is a pure key-value store.
//! 4. All I/O errors are propagated, never silently ignored.

pub mod error;
pub mod loose;
pub mod memory;
pub mod object;
pub mod traits;
pub mod tree;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use loose::LooseObjectStore;
pub use memory::InMemoryObjectStore;
pub use object::{Blob, Commit, Object, ObjectKind, StoredObject, Tag};
pub use traits::ObjectStore;
pub use tree::{validate_entry_name, FileMode, Tree, TreeBuilder, TreeEntry};
