//! Reference management for Cairn.
//!
//! References are the human-readable entry points into the object store:
//! names bound either directly to an object id or to another reference.
//!
//! # Architecture
//!
//! - **Direct refs** hold an [`ObjectId`](cairn_types::ObjectId).
//! - **Symbolic refs** hold the name of another ref (e.g. `HEAD` naming the
//!   current branch). Chains are resolved by the repository layer with a
//!   depth bound.
//! - **Names** follow two grammars: top-level (`HEAD`, `ORIG_HEAD`) and
//!   hierarchical (`refs/...`).
//!
//! # Modules
//!
//! - [`error`] -- Error types for ref operations
//! - [`types`] -- Core ref types: [`Ref`], [`RefTarget`], [`ReferenceType`], [`ReferenceFilter`]
//! - [`traits`] -- The [`RefStore`] trait defining the storage interface
//! - [`names`] -- Name grammar and namespace prefixes
//! - [`memory`] -- In-memory [`InMemoryRefStore`]
//! - [`fs`] -- One-file-per-ref [`FsRefStore`]

pub mod error;
pub mod fs;
pub mod memory;
pub mod names;
pub mod traits;
pub mod types;

pub use error::{RefError, Result};
pub use fs::FsRefStore;
pub use memory::InMemoryRefStore;
pub use names::{is_valid_name, validate_name};
pub use traits::RefStore;
pub use types::{shorthand, Ref, RefTarget, ReferenceFilter, ReferenceType};
