//! Error types for reference operations.

use thiserror::Error;

/// Errors that can occur during reference operations.
#[derive(Debug, Error)]
pub enum RefError {
    /// The reference name does not satisfy the name grammar.
    #[error("invalid ref name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },

    /// A stored ref could not be parsed.
    #[error("corrupt ref {name}: {reason}")]
    Corrupt { name: String, reason: String },

    /// The backing store is unusable (e.g. a poisoned lock).
    #[error("ref storage error: {0}")]
    Storage(String),

    /// I/O error during file-based ref operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for ref operations.
pub type Result<T> = std::result::Result<T, RefError>;
