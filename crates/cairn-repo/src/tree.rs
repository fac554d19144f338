//! Tree handles.
//!
//! Entries returned by id, index or name are borrowed from the handle and
//! cannot outlive it. Path lookup may read several subtrees from the store,
//! so it returns an owned [`TreeEntry`].

use cairn_store::{Tree, TreeEntry};
use cairn_types::ObjectId;

use crate::error::RepoResult;
use crate::object::ObjectHandle;
use crate::repository::Repository;

/// A decoded tree borrowed from a repository.
#[derive(Clone, Debug)]
pub struct TreeHandle<'repo> {
    repo: &'repo Repository,
    id: ObjectId,
    tree: Tree,
}

impl<'repo> TreeHandle<'repo> {
    pub(crate) fn new(repo: &'repo Repository, id: ObjectId, tree: Tree) -> Self {
        Self { repo, id, tree }
    }

    /// The tree's own content address.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// The owning repository.
    pub fn owner(&self) -> &'repo Repository {
        self.repo
    }

    /// The decoded tree.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// First entry, in canonical order, whose target is `id`.
    pub fn lookup_entry_by_id(&self, id: &ObjectId) -> Option<&TreeEntry> {
        self.tree.entry_by_id(id)
    }

    /// Entry at position `index` in canonical order.
    pub fn lookup_entry_by_index(&self, index: usize) -> RepoResult<&TreeEntry> {
        Ok(self.tree.entry_by_index(index)?)
    }

    /// Immediate entry named `name`. No path traversal.
    pub fn lookup_entry_by_name(&self, name: &str) -> Option<&TreeEntry> {
        self.tree.entry_by_name(name)
    }

    /// Entry at the `/`-separated `path`, reading nested trees as needed.
    pub fn lookup_entry_by_path(&self, path: &str) -> RepoResult<TreeEntry> {
        Ok(self.tree.entry_by_path(self.repo.objects(), path)?)
    }

    /// Load the object an entry points at.
    pub fn entry_object(&self, entry: &TreeEntry) -> RepoResult<ObjectHandle<'repo>> {
        self.repo.find_object(&entry.object_id)
    }

    /// Entries in canonical order.
    pub fn iter(&self) -> std::slice::Iter<'_, TreeEntry> {
        self.tree.iter()
    }
}

impl<'a> IntoIterator for &'a TreeHandle<'_> {
    type Item = &'a TreeEntry;
    type IntoIter = std::slice::Iter<'a, TreeEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use cairn_store::{FileMode, TreeBuilder};

    /// Builds `README`, `bin/run` (executable), `src/lib/mod.rs` and a `link`.
    fn nested(repo: &Repository) -> ObjectId {
        let readme = repo.write_blob(b"# readme").unwrap();
        let run = repo.write_blob(b"#!/bin/sh").unwrap();
        let module = repo.write_blob(b"pub fn f() {}").unwrap();

        let lib = Tree::new(vec![TreeEntry::new(FileMode::Blob, "mod.rs", module)]).unwrap();
        let lib_id = repo.write_tree(&lib).unwrap();
        let src = Tree::new(vec![TreeEntry::new(FileMode::Tree, "lib", lib_id)]).unwrap();
        let src_id = repo.write_tree(&src).unwrap();
        let bin = Tree::new(vec![TreeEntry::new(FileMode::BlobExecutable, "run", run)]).unwrap();
        let bin_id = repo.write_tree(&bin).unwrap();

        let mut root = TreeBuilder::new();
        root.insert("README", FileMode::Blob, readme).unwrap();
        root.insert("bin", FileMode::Tree, bin_id).unwrap();
        root.insert("src", FileMode::Tree, src_id).unwrap();
        root.insert("link", FileMode::Link, readme).unwrap();
        repo.write_tree(&root.build().unwrap()).unwrap()
    }

    #[test]
    fn lookup_by_name_index_and_id() {
        let repo = Repository::in_memory().unwrap();
        let tree = repo.find_tree(&nested(&repo)).unwrap();

        assert_eq!(tree.size(), 4);
        let names: Vec<&str> = tree.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["README", "bin", "link", "src"]);

        let readme = tree.lookup_entry_by_name("README").unwrap();
        assert_eq!(tree.lookup_entry_by_index(0).unwrap(), readme);
        assert_eq!(
            tree.lookup_entry_by_id(&readme.object_id).unwrap().name,
            "README"
        );
        assert!(tree.lookup_entry_by_name("missing").is_none());
        assert!(tree.lookup_entry_by_name("src/lib").is_none());
        assert!(tree.lookup_entry_by_id(&ObjectId::from_bytes(b"x")).is_none());
    }

    #[test]
    fn index_is_bounds_checked() {
        let repo = Repository::in_memory().unwrap();
        let tree = repo.find_tree(&nested(&repo)).unwrap();
        let err = tree.lookup_entry_by_index(4).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::IndexOutOfRange);
    }

    #[test]
    fn path_lookup_walks_subtrees() {
        let repo = Repository::in_memory().unwrap();
        let tree = repo.find_tree(&nested(&repo)).unwrap();

        let entry = tree.lookup_entry_by_path("src/lib/mod.rs").unwrap();
        assert_eq!(entry.name, "mod.rs");
        assert_eq!(entry.mode, FileMode::Blob);

        let run = tree.lookup_entry_by_path("bin/run").unwrap();
        assert_eq!(run.mode, FileMode::BlobExecutable);

        let lib = tree.lookup_entry_by_path("src/lib/").unwrap();
        assert!(lib.is_tree());
    }

    #[test]
    fn path_lookup_failures() {
        let repo = Repository::in_memory().unwrap();
        let tree = repo.find_tree(&nested(&repo)).unwrap();

        for path in ["nope", "src/nope", "src/lib/mod.rs/x/y", "", "src//lib"] {
            let err = tree.lookup_entry_by_path(path).unwrap_err();
            assert!(
                matches!(err.kind(), ErrorKind::NotFound | ErrorKind::NotATree),
                "{path}: {err}"
            );
        }
        assert_eq!(
            tree.lookup_entry_by_path("README/x").unwrap_err().kind(),
            ErrorKind::NotATree
        );
        assert_eq!(
            tree.lookup_entry_by_path("README/").unwrap_err().kind(),
            ErrorKind::NotATree
        );
        assert_eq!(
            tree.lookup_entry_by_path("nope/x").unwrap_err().kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn entry_object_and_into_iter() {
        let repo = Repository::in_memory().unwrap();
        let tree = repo.find_tree(&nested(&repo)).unwrap();
        let mut count = 0;
        for entry in &tree {
            let object = tree.entry_object(entry).unwrap();
            assert_eq!(object.kind(), entry.mode.object_kind());
            count += 1;
        }
        assert_eq!(count, tree.size());
    }
}
