//! Repository facade for Cairn.
//!
//! Ties an object store and a reference store together behind a
//! [`Repository`] and exposes borrowed handles over them:
//!
//! - [`Reference`] -- name classification, symbolic resolution and peeling
//! - [`TreeHandle`] -- ordered directory snapshots with id, index, name and
//!   path lookups
//! - [`ObjectHandle`] -- decoded objects with peeling
//!
//! Handles borrow the repository they came from, so the compiler rejects
//! any use after the repository is gone. Values that outlive a single store
//! read (path lookups, `copy`, `resolve`) are returned owned.
//!
//! ```
//! use cairn_repo::{FileMode, Repository, TreeBuilder};
//!
//! let repo = Repository::in_memory().unwrap();
//! let blob = repo.write_blob(b"hello").unwrap();
//! let mut builder = TreeBuilder::new();
//! builder.insert("hello.txt", FileMode::Blob, blob).unwrap();
//! let tree_id = repo.write_tree(&builder.build().unwrap()).unwrap();
//!
//! let tree = repo.find_tree(&tree_id).unwrap();
//! assert_eq!(tree.lookup_entry_by_path("hello.txt").unwrap().object_id, blob);
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod object;
pub mod reference;
pub mod repository;
pub mod tree;

pub use config::RepositoryConfig;
pub use context::{ContextGuard, LibraryContext};
pub use error::{ErrorKind, RepoError, RepoResult};
pub use object::ObjectHandle;
pub use reference::Reference;
pub use repository::{Repository, DEFAULT_BRANCH};
pub use tree::TreeHandle;

// Re-export key types
pub use cairn_refs::{ReferenceFilter, ReferenceType};
pub use cairn_store::{Blob, Commit, FileMode, Object, ObjectKind, Tag, Tree, TreeBuilder, TreeEntry};
pub use cairn_types::ObjectId;
