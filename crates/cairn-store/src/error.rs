use cairn_types::ObjectId;

/// Errors from object store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The requested object was not found.
    #[error("object not found: {0}")]
    NotFound(ObjectId),

    /// Content hash mismatch on read (data corruption).
    #[error("hash mismatch for {id}: expected {expected}, computed {computed}")]
    HashMismatch {
        id: ObjectId,
        expected: String,
        computed: String,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing store is unusable (e.g. a poisoned lock).
    #[error("object storage error: {0}")]
    Storage(String),

    /// The object data is malformed or cannot be decoded.
    #[error("corrupt object {id}: {reason}")]
    CorruptObject { id: ObjectId, reason: String },

    /// Attempted to write a null object ID.
    #[error("cannot store object with null ID")]
    NullObjectId,

    /// A tree entry name is not a single, well-formed path component.
    #[error("invalid tree entry name {name:?}: {reason}")]
    InvalidEntryName { name: String, reason: String },

    /// Two entries in one tree share a name.
    #[error("duplicate tree entry: {0}")]
    DuplicateEntry(String),

    /// A path component does not exist in its tree.
    #[error("path not found: {path}")]
    PathNotFound { path: String },

    /// A path traversal stepped through something that is not a tree.
    #[error("not a tree: {path}")]
    NotATree { path: String },

    /// Positional entry access past the end of a tree.
    #[error("entry index {index} out of range for tree of {len} entries")]
    IndexOutOfRange { index: usize, len: usize },
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
