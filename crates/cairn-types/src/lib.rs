//! Foundation types for Cairn.
//!
//! Every other Cairn crate depends on `cairn-types` for the object identifier
//! that keys the object store and that direct references point at.
//!
//! # Key Types
//!
//! - [`ObjectId`] -- Content-addressed identifier (BLAKE3 digest)
//! - [`TypeError`] -- Parse failures for identifiers

pub mod error;
pub mod object;

pub use error::TypeError;
pub use object::{ObjectId, OID_HEX_LEN, OID_LEN};
