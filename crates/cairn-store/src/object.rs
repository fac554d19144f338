use std::str::FromStr;

use cairn_crypto::ContentHasher;
use cairn_types::ObjectId;
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::tree::Tree;

/// The kind of object stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    /// Raw content (file contents, arbitrary data).
    Blob,
    /// Directory listing: ordered entries mapping names to object references.
    Tree,
    /// Snapshot of a root tree with parent links and a message.
    Commit,
    /// Annotated tag pointing at another object.
    Tag,
}

impl ObjectKind {
    /// Lowercase name used in serialized headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    fn hasher(&self) -> &'static ContentHasher {
        match self {
            Self::Blob => &ContentHasher::BLOB,
            Self::Tree => &ContentHasher::TREE,
            Self::Commit => &ContentHasher::COMMIT,
            Self::Tag => &ContentHasher::TAG,
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectKind {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            other => Err(StoreError::Serialization(format!(
                "unknown object kind: {other:?}"
            ))),
        }
    }
}

/// A stored object: kind tag + serialized data + cached size.
///
/// `StoredObject` is the unit of storage. The store never interprets the
/// contents of the data; it is a pure key-value store keyed by content hash.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredObject {
    /// The type of this object.
    pub kind: ObjectKind,
    /// The serialized bytes of the object.
    pub data: Vec<u8>,
    /// The size of `data` in bytes.
    pub size: u64,
}

impl StoredObject {
    /// Create a new stored object from kind and data.
    pub fn new(kind: ObjectKind, data: Vec<u8>) -> Self {
        let size = data.len() as u64;
        Self { kind, data, size }
    }

    /// Compute the content-addressed ID for this object.
    ///
    /// Uses the domain-separated hasher for the object's kind.
    pub fn compute_id(&self) -> ObjectId {
        self.kind.hasher().hash(&self.data)
    }

    fn expect_kind(&self, kind: ObjectKind) -> StoreResult<()> {
        if self.kind != kind {
            return Err(StoreError::CorruptObject {
                id: self.compute_id(),
                reason: format!("expected {kind}, got {}", self.kind),
            });
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Blob
// ---------------------------------------------------------------------------

/// Raw content object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blob {
    pub data: Vec<u8>,
}

impl Blob {
    /// Create a new blob from raw bytes.
    pub fn new(data: Vec<u8>) -> Self {
        Self { data }
    }

    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        StoredObject::new(ObjectKind::Blob, self.data.clone())
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Blob)?;
        Ok(Self {
            data: obj.data.clone(),
        })
    }
}

// ---------------------------------------------------------------------------
// Commit
// ---------------------------------------------------------------------------

/// A snapshot of a root tree plus its history links.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// Root tree of the snapshot.
    pub tree: ObjectId,
    /// Parent commits, in order. Empty for a root commit.
    pub parents: Vec<ObjectId>,
    /// Free-form author line.
    pub author: String,
    /// Commit message.
    pub message: String,
}

impl Commit {
    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Commit, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Commit)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// An annotated tag: a named, messaged pointer to another object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The tagged object.
    pub target: ObjectId,
    /// Kind of the tagged object, recorded at tag time.
    pub target_kind: ObjectKind,
    /// Tag name (e.g. "v1.0.0").
    pub name: String,
    /// Free-form tagger line.
    pub tagger: String,
    /// Tag message.
    pub message: String,
}

impl Tag {
    /// Convert into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        let data =
            serde_json::to_vec(self).map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(StoredObject::new(ObjectKind::Tag, data))
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        obj.expect_kind(ObjectKind::Tag)?;
        serde_json::from_slice(&obj.data).map_err(|e| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: e.to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Object
// ---------------------------------------------------------------------------

/// A decoded object of any kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
    Tag(Tag),
}

impl Object {
    /// Decode a stored object according to its kind tag.
    pub fn decode(obj: &StoredObject) -> StoreResult<Self> {
        Ok(match obj.kind {
            ObjectKind::Blob => Self::Blob(Blob::from_stored_object(obj)?),
            ObjectKind::Tree => Self::Tree(Tree::from_stored_object(obj)?),
            ObjectKind::Commit => Self::Commit(Commit::from_stored_object(obj)?),
            ObjectKind::Tag => Self::Tag(Tag::from_stored_object(obj)?),
        })
    }

    /// Serialize back into a `StoredObject`.
    pub fn to_stored_object(&self) -> StoreResult<StoredObject> {
        match self {
            Self::Blob(blob) => Ok(blob.to_stored_object()),
            Self::Tree(tree) => Ok(tree.to_stored_object()),
            Self::Commit(commit) => commit.to_stored_object(),
            Self::Tag(tag) => tag.to_stored_object(),
        }
    }

    /// The kind of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// The object one peeling step away from this one, if any.
    ///
    /// Tags peel to their target and commits peel to their root tree. Blobs
    /// and trees cannot be peeled.
    pub fn peel_step(&self) -> Option<ObjectId> {
        match self {
            Self::Tag(tag) => Some(tag.target),
            Self::Commit(commit) => Some(commit.tree),
            Self::Blob(_) | Self::Tree(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_commit() -> Commit {
        Commit {
            tree: ObjectId::from_bytes(b"root"),
            parents: vec![ObjectId::from_bytes(b"parent")],
            author: "Ada <ada@example.com>".into(),
            message: "initial import".into(),
        }
    }

    #[test]
    fn blob_roundtrip() {
        let blob = Blob::new(b"hello world".to_vec());
        let stored = blob.to_stored_object();
        let decoded = Blob::from_stored_object(&stored).unwrap();
        assert_eq!(blob, decoded);
    }

    #[test]
    fn blob_kind_mismatch() {
        let stored = StoredObject::new(ObjectKind::Tree, b"not a tree".to_vec());
        let err = Blob::from_stored_object(&stored).unwrap_err();
        assert!(matches!(err, StoreError::CorruptObject { .. }));
    }

    #[test]
    fn commit_roundtrip() {
        let commit = sample_commit();
        let stored = commit.to_stored_object().unwrap();
        assert_eq!(stored.kind, ObjectKind::Commit);
        assert_eq!(Commit::from_stored_object(&stored).unwrap(), commit);
    }

    #[test]
    fn corrupt_commit_payload() {
        let stored = StoredObject::new(ObjectKind::Commit, b"{not json".to_vec());
        assert!(matches!(
            Commit::from_stored_object(&stored).unwrap_err(),
            StoreError::CorruptObject { .. }
        ));
    }

    #[test]
    fn tag_roundtrip() {
        let tag = Tag {
            target: ObjectId::from_bytes(b"commit"),
            target_kind: ObjectKind::Commit,
            name: "v1.0.0".into(),
            tagger: "Ada".into(),
            message: "release".into(),
        };
        let stored = tag.to_stored_object().unwrap();
        assert_eq!(Tag::from_stored_object(&stored).unwrap(), tag);
    }

    #[test]
    fn object_decode_dispatches_on_kind() {
        let stored = sample_commit().to_stored_object().unwrap();
        let object = Object::decode(&stored).unwrap();
        assert_eq!(object.kind(), ObjectKind::Commit);
        assert_eq!(object.to_stored_object().unwrap(), stored);
    }

    #[test]
    fn peel_steps() {
        let commit = Object::Commit(sample_commit());
        assert_eq!(commit.peel_step(), Some(ObjectId::from_bytes(b"root")));
        assert_eq!(Object::Blob(Blob::new(vec![])).peel_step(), None);
        assert_eq!(Object::Tree(Tree::empty()).peel_step(), None);
    }

    #[test]
    fn stored_object_id_deterministic() {
        let obj = StoredObject::new(ObjectKind::Blob, b"deterministic".to_vec());
        assert_eq!(obj.compute_id(), obj.compute_id());
    }

    #[test]
    fn different_kinds_produce_different_ids() {
        let data = b"same data".to_vec();
        let blob = StoredObject::new(ObjectKind::Blob, data.clone());
        let tree = StoredObject::new(ObjectKind::Tree, data.clone());
        let tag = StoredObject::new(ObjectKind::Tag, data);
        assert_ne!(blob.compute_id(), tree.compute_id());
        assert_ne!(blob.compute_id(), tag.compute_id());
    }

    #[test]
    fn object_kind_display_and_parse() {
        for kind in [
            ObjectKind::Blob,
            ObjectKind::Tree,
            ObjectKind::Commit,
            ObjectKind::Tag,
        ] {
            assert_eq!(kind.to_string().parse::<ObjectKind>().unwrap(), kind);
        }
        assert!("snapshot".parse::<ObjectKind>().is_err());
    }
}
