use std::io;

use cairn_refs::RefError;
use cairn_store::{ObjectKind, StoreError};
use cairn_types::ObjectId;
use thiserror::Error;

/// Errors surfaced by repository, reference, tree and object handles.
#[derive(Debug, Error)]
pub enum RepoError {
    /// A reference, object or path does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The backing storage failed.
    #[error("io failure: {0}")]
    IoFailure(#[from] io::Error),

    /// The operation does not apply to this handle's variant.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A symbolic chain is longer than the configured bound.
    #[error("symbolic reference {name} did not resolve within {depth} steps")]
    ResolutionCycle { name: String, depth: usize },

    /// The requested kind cannot be reached by peeling.
    #[error("object {id} cannot be peeled to a {kind}")]
    PeelingFailure { id: ObjectId, kind: ObjectKind },

    /// Positional tree access past the last entry.
    #[error("entry index {index} out of range for tree of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },

    /// Path traversal stepped through a non-tree entry.
    #[error("not a tree: {path}")]
    NotATree { path: String },

    /// A reference or tree entry name is malformed.
    #[error("invalid name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A reference with this name already exists.
    #[error("already exists: {0}")]
    AlreadyExists(String),

    /// Stored data failed to decode or verify.
    #[error("corrupt data: {0}")]
    Corrupt(String),

    /// The repository configuration is unreadable or out of range.
    #[error("invalid config: {0}")]
    Config(String),
}

/// Error kind without payload, for callers that only branch on the category.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    NotFound,
    IoFailure,
    InvalidOperation,
    ResolutionCycle,
    PeelingFailure,
    IndexOutOfRange,
    NotATree,
    InvalidName,
    AlreadyExists,
    Corrupt,
    Config,
}

impl RepoError {
    /// The category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::IoFailure(_) => ErrorKind::IoFailure,
            Self::InvalidOperation(_) => ErrorKind::InvalidOperation,
            Self::ResolutionCycle { .. } => ErrorKind::ResolutionCycle,
            Self::PeelingFailure { .. } => ErrorKind::PeelingFailure,
            Self::IndexOutOfRange { .. } => ErrorKind::IndexOutOfRange,
            Self::NotATree { .. } => ErrorKind::NotATree,
            Self::InvalidName { .. } => ErrorKind::InvalidName,
            Self::AlreadyExists(_) => ErrorKind::AlreadyExists,
            Self::Corrupt(_) => ErrorKind::Corrupt,
            Self::Config(_) => ErrorKind::Config,
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(id) => Self::NotFound(format!("object {id}")),
            StoreError::PathNotFound { path } => Self::NotFound(format!("path {path}")),
            StoreError::NotATree { path } => Self::NotATree { path },
            StoreError::IndexOutOfRange { index, len } => Self::IndexOutOfRange { index, len },
            StoreError::InvalidEntryName { name, reason } => Self::InvalidName { name, reason },
            StoreError::DuplicateEntry(name) => {
                Self::InvalidOperation(format!("duplicate tree entry {name:?}"))
            }
            StoreError::NullObjectId => {
                Self::InvalidOperation("cannot store object with null id".into())
            }
            StoreError::Io(e) => Self::IoFailure(e),
            StoreError::Storage(msg) => Self::IoFailure(io::Error::other(msg)),
            err @ (StoreError::HashMismatch { .. }
            | StoreError::CorruptObject { .. }
            | StoreError::Serialization(_)) => Self::Corrupt(err.to_string()),
        }
    }
}

impl From<RefError> for RepoError {
    fn from(err: RefError) -> Self {
        match err {
            RefError::InvalidName { name, reason } => Self::InvalidName { name, reason },
            RefError::Corrupt { .. } => Self::Corrupt(err.to_string()),
            RefError::Storage(msg) => Self::IoFailure(io::Error::other(msg)),
            RefError::Io(e) => Self::IoFailure(e),
        }
    }
}

/// Result alias for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
