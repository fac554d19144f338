use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Width of an object identifier in bytes.
pub const OID_LEN: usize = 32;

/// Width of an object identifier in hex characters.
pub const OID_HEX_LEN: usize = OID_LEN * 2;

/// Content-addressed identifier for any stored object.
///
/// An `ObjectId` is a BLAKE3 digest of an object's kind and serialized
/// content. Identical content always produces the same `ObjectId`, and the
/// derived total order is byte-wise, so ids sort the same way everywhere.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectId([u8; OID_LEN]);

impl ObjectId {
    /// Compute an `ObjectId` from raw bytes, without domain separation.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self(*blake3::hash(data).as_bytes())
    }

    /// Create an `ObjectId` from a pre-computed hash.
    pub const fn from_hash(hash: [u8; OID_LEN]) -> Self {
        Self(hash)
    }

    /// Create an `ObjectId` from a raw byte slice of exactly [`OID_LEN`] bytes.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, TypeError> {
        let arr: [u8; OID_LEN] = bytes.try_into().map_err(|_| TypeError::InvalidLength {
            expected: OID_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// The null object ID (all zeros). Represents "no object".
    pub const fn null() -> Self {
        Self([0u8; OID_LEN])
    }

    /// Returns `true` if this is the null object ID.
    pub fn is_null(&self) -> bool {
        self.0 == [0u8; OID_LEN]
    }

    /// The raw 32-byte hash.
    pub fn as_bytes(&self) -> &[u8; OID_LEN] {
        &self.0
    }

    /// Hex-encoded string representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }

    /// Parse from a full-length hex string.
    pub fn from_hex(s: &str) -> Result<Self, TypeError> {
        let bytes = hex::decode(s).map_err(|e| TypeError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    /// Returns `true` if the hex form of this id starts with `prefix`.
    ///
    /// Comparison is case-insensitive. An empty prefix matches every id.
    pub fn matches_hex_prefix(&self, prefix: &str) -> bool {
        prefix.len() <= OID_HEX_LEN && self.to_hex().starts_with(&prefix.to_ascii_lowercase())
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.short_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl FromStr for ObjectId {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s.trim())
    }
}

impl From<[u8; OID_LEN]> for ObjectId {
    fn from(bytes: [u8; OID_LEN]) -> Self {
        Self(bytes)
    }
}

impl From<ObjectId> for [u8; OID_LEN] {
    fn from(id: ObjectId) -> Self {
        id.0
    }
}

impl AsRef<[u8]> for ObjectId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}
