//! Tree objects: one immutable directory level.
//!
//! Entries are kept in canonical order: byte-wise on the name, with a tree
//! entry compared as though its name ended in `/`. The binary encoding is the
//! concatenation of, for every entry in that order,
//!
//! ```text
//! <octal mode> SP <name> NUL <32-byte object id>
//! ```
//!
//! so a tree's id depends only on its set of (name, mode, id) triples, never
//! on the order they were supplied in.

use std::borrow::Cow;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use cairn_types::{ObjectId, OID_LEN};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// File mode for a tree entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileMode {
    /// Normal file (0o100644).
    Blob,
    /// Executable file (0o100755).
    BlobExecutable,
    /// Subtree / directory (0o040000).
    Tree,
    /// Symbolic link (0o120000).
    Link,
    /// Submodule commit link (0o160000).
    Commit,
}

impl FileMode {
    /// Octal mode value as persisted.
    pub fn mode_bits(&self) -> u32 {
        match self {
            Self::Blob => 0o100644,
            Self::BlobExecutable => 0o100755,
            Self::Tree => 0o040000,
            Self::Link => 0o120000,
            Self::Commit => 0o160000,
        }
    }

    /// Parse from an octal mode value.
    pub fn from_mode_bits(bits: u32) -> Option<Self> {
        match bits {
            0o100644 => Some(Self::Blob),
            0o100755 => Some(Self::BlobExecutable),
            0o040000 => Some(Self::Tree),
            0o120000 => Some(Self::Link),
            0o160000 => Some(Self::Commit),
            _ => None,
        }
    }

    /// Returns `true` for subtree entries.
    pub fn is_tree(&self) -> bool {
        matches!(self, Self::Tree)
    }

    /// The kind of object an entry with this mode points at.
    pub fn object_kind(&self) -> ObjectKind {
        match self {
            Self::Blob | Self::BlobExecutable | Self::Link => ObjectKind::Blob,
            Self::Tree => ObjectKind::Tree,
            Self::Commit => ObjectKind::Commit,
        }
    }
}

impl std::fmt::Display for FileMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:06o}", self.mode_bits())
    }
}

/// A single entry in a tree object.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeEntry {
    /// File mode (blob, executable, tree, symlink, commit link).
    pub mode: FileMode,
    /// Entry name: a single path component.
    pub name: String,
    /// Content-addressed ID of the referenced object.
    pub object_id: ObjectId,
}

impl TreeEntry {
    /// Create a new tree entry.
    pub fn new(mode: FileMode, name: impl Into<String>, object_id: ObjectId) -> Self {
        Self {
            mode,
            name: name.into(),
            object_id,
        }
    }

    /// Returns `true` if this entry points at a subtree.
    pub fn is_tree(&self) -> bool {
        self.mode.is_tree()
    }

    /// Compare two entries in canonical tree order.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(other.sort_key())
    }

    fn sort_key(&self) -> impl Iterator<Item = u8> + '_ {
        let suffix = self.is_tree().then_some(b'/');
        self.name.bytes().chain(suffix)
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical_cmp(other)
            .then_with(|| self.mode.mode_bits().cmp(&other.mode.mode_bits()))
            .then_with(|| self.object_id.cmp(&other.object_id))
    }
}

/// Check that `name` is usable as a single tree entry name.
pub fn validate_entry_name(name: &str) -> StoreResult<()> {
    let reason = if name.is_empty() {
        "name must not be empty"
    } else if name == "." || name == ".." {
        "name must not be a relative path component"
    } else if name.contains('/') {
        "name must not contain '/'"
    } else if name.contains('\0') {
        "name must not contain NUL"
    } else {
        return Ok(());
    };
    Err(StoreError::InvalidEntryName {
        name: name.to_string(),
        reason: reason.into(),
    })
}

/// Directory listing object.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// Create a new tree with the given entries.
    ///
    /// Entries are sorted into canonical order for deterministic hashing.
    /// Fails on malformed or duplicate names.
    pub fn new(mut entries: Vec<TreeEntry>) -> StoreResult<Self> {
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }
        entries.sort();
        let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
        names.sort_unstable();
        if let Some(dup) = names.windows(2).find(|w| w[0] == w[1]) {
            return Err(StoreError::DuplicateEntry(dup[0].to_string()));
        }
        Ok(Self { entries })
    }

    /// Create an empty tree.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The entries in canonical order.
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// Iterate over entries in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.entries.iter()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the tree has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The content-addressed id this tree is stored under.
    pub fn id(&self) -> ObjectId {
        self.to_stored_object().compute_id()
    }

    /// First entry whose target is `id`.
    pub fn entry_by_id(&self, id: &ObjectId) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.object_id == *id)
    }

    /// Entry at position `index` in canonical order.
    pub fn entry_by_index(&self, index: usize) -> StoreResult<&TreeEntry> {
        self.entries.get(index).ok_or(StoreError::IndexOutOfRange {
            index,
            len: self.entries.len(),
        })
    }

    /// Entry with exactly this name in this tree (no path traversal).
    pub fn entry_by_name(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Walk `/`-separated `path` from this tree, reading subtrees from `store`.
    ///
    /// A trailing `/` requires the final entry to be a tree. The returned
    /// entry is an owned copy; nothing is returned on failure.
    pub fn entry_by_path<S>(&self, store: &S, path: &str) -> StoreResult<TreeEntry>
    where
        S: ObjectStore + ?Sized,
    {
        let not_found = || StoreError::PathNotFound {
            path: path.to_string(),
        };
        let (trimmed, want_tree) = match path.strip_suffix('/') {
            Some(rest) => (rest, true),
            None => (path, false),
        };
        if trimmed.is_empty() {
            return Err(not_found());
        }
        let components: Vec<&str> = trimmed.split('/').collect();
        if components.iter().any(|c| c.is_empty()) {
            return Err(not_found());
        }

        let mut current: Cow<'_, Tree> = Cow::Borrowed(self);
        for (depth, component) in components.iter().enumerate() {
            let entry = current.entry_by_name(component).ok_or_else(not_found)?;
            let walked = components[..=depth].join("/");

            if depth + 1 == components.len() {
                if want_tree && !entry.is_tree() {
                    return Err(StoreError::NotATree { path: walked });
                }
                return Ok(entry.clone());
            }
            if !entry.is_tree() {
                return Err(StoreError::NotATree { path: walked });
            }

            let subtree_id = entry.object_id;
            let stored = store
                .read(&subtree_id)?
                .ok_or(StoreError::NotFound(subtree_id))?;
            current = Cow::Owned(Tree::from_stored_object(&stored)?);
        }
        Err(not_found())
    }

    /// Encode into a `StoredObject` for storage.
    pub fn to_stored_object(&self) -> StoredObject {
        let mut data = Vec::with_capacity(self.entries.len() * (OID_LEN + 16));
        for entry in &self.entries {
            data.extend_from_slice(format!("{:o} ", entry.mode.mode_bits()).as_bytes());
            data.extend_from_slice(entry.name.as_bytes());
            data.push(0);
            data.extend_from_slice(entry.object_id.as_bytes());
        }
        StoredObject::new(ObjectKind::Tree, data)
    }

    /// Decode from a `StoredObject`.
    pub fn from_stored_object(obj: &StoredObject) -> StoreResult<Self> {
        if obj.kind != ObjectKind::Tree {
            return Err(StoreError::CorruptObject {
                id: obj.compute_id(),
                reason: format!("expected tree, got {}", obj.kind),
            });
        }
        let corrupt = |reason: &str| StoreError::CorruptObject {
            id: obj.compute_id(),
            reason: reason.to_string(),
        };

        let mut entries = Vec::new();
        let mut rest = obj.data.as_slice();
        while !rest.is_empty() {
            let space = rest
                .iter()
                .position(|&b| b == b' ')
                .ok_or_else(|| corrupt("missing mode separator"))?;
            let mode_str =
                std::str::from_utf8(&rest[..space]).map_err(|_| corrupt("non-utf8 mode"))?;
            let bits = u32::from_str_radix(mode_str, 8).map_err(|_| corrupt("bad mode"))?;
            let mode = FileMode::from_mode_bits(bits).ok_or_else(|| corrupt("unknown mode"))?;
            rest = &rest[space + 1..];

            let nul = rest
                .iter()
                .position(|&b| b == 0)
                .ok_or_else(|| corrupt("missing name terminator"))?;
            let name = std::str::from_utf8(&rest[..nul])
                .map_err(|_| corrupt("non-utf8 entry name"))?
                .to_string();
            rest = &rest[nul + 1..];

            if rest.len() < OID_LEN {
                return Err(corrupt("truncated object id"));
            }
            let object_id = ObjectId::from_slice(&rest[..OID_LEN])
                .map_err(|_| corrupt("truncated object id"))?;
            rest = &rest[OID_LEN..];

            entries.push(TreeEntry::new(mode, name, object_id));
        }

        let tree = Self::new(entries).map_err(|e| corrupt(&e.to_string()))?;
        if tree.to_stored_object().data != obj.data {
            return Err(corrupt("entries are not in canonical order"));
        }
        Ok(tree)
    }
}

impl<'a> IntoIterator for &'a Tree {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Incremental tree construction keyed by entry name.
///
/// Inserting a name that already exists replaces the previous entry.
#[derive(Clone, Debug, Default)]
pub struct TreeBuilder {
    entries: BTreeMap<String, TreeEntry>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the entries of an existing tree.
    pub fn from_tree(tree: &Tree) -> Self {
        Self {
            entries: tree
                .iter()
                .map(|e| (e.name.clone(), e.clone()))
                .collect(),
        }
    }

    /// Insert or replace an entry. Returns the replaced entry, if any.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        mode: FileMode,
        object_id: ObjectId,
    ) -> StoreResult<Option<TreeEntry>> {
        let name = name.into();
        validate_entry_name(&name)?;
        let entry = TreeEntry::new(mode, name.clone(), object_id);
        Ok(self.entries.insert(name, entry))
    }

    /// Remove an entry by name.
    pub fn remove(&mut self, name: &str) -> Option<TreeEntry> {
        self.entries.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Produce the immutable tree.
    pub fn build(self) -> StoreResult<Tree> {
        Tree::new(self.entries.into_values().collect())
    }
}
