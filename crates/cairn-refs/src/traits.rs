//! The [`RefStore`] trait defining the reference storage interface.
//!
//! Any backend (in-memory, filesystem, database) implements this trait to
//! provide named reference management.

use crate::error::Result;
use crate::names::{HEADS_DIR, REMOTES_DIR, TAGS_DIR};
use crate::types::Ref;

/// Storage backend for named references.
///
/// Implementations must be thread-safe (`Send + Sync`) and provide atomic
/// read/write/delete operations on individual refs. The namespace follows a
/// hierarchical layout:
///
/// - top-level names such as `HEAD`
/// - `refs/heads/*` for branches
/// - `refs/tags/*` for tags
/// - `refs/remotes/{remote}/*` for remote tracking refs
/// - `refs/notes/*` for notes
pub trait RefStore: Send + Sync {
    /// Read a ref by its full name (e.g. "refs/heads/main").
    ///
    /// Returns `Ok(None)` if the ref does not exist.
    fn read_ref(&self, name: &str) -> Result<Option<Ref>>;

    /// Create or update the ref named `reference.name`.
    ///
    /// Fails with `InvalidName` if the name does not satisfy the grammar, or
    /// if it would turn an existing ref into a namespace (`refs/heads/a/b`
    /// while `refs/heads/a` exists) or the other way around.
    fn write_ref(&self, reference: &Ref) -> Result<()>;

    /// Delete a ref by full name.
    ///
    /// Returns `Ok(true)` if the ref existed and was deleted, `Ok(false)` if
    /// it did not exist.
    fn delete_ref(&self, name: &str) -> Result<bool>;

    /// List all refs whose name starts with `prefix`, sorted by name.
    ///
    /// Pass `""` to list all refs. Pass `"refs/heads/"` for branches only.
    fn list_refs(&self, prefix: &str) -> Result<Vec<Ref>>;

    /// List all branch refs.
    fn branches(&self) -> Result<Vec<Ref>> {
        self.list_refs(HEADS_DIR)
    }

    /// List all tag refs.
    fn tags(&self) -> Result<Vec<Ref>> {
        self.list_refs(TAGS_DIR)
    }

    /// List all known remote names.
    fn remotes(&self) -> Result<Vec<String>> {
        let refs = self.list_refs(REMOTES_DIR)?;
        let mut remotes: Vec<String> = refs
            .iter()
            .filter_map(|r| {
                let rest = r.name.strip_prefix(REMOTES_DIR)?;
                let remote = rest.split('/').next()?;
                Some(remote.to_string())
            })
            .collect();
        remotes.sort();
        remotes.dedup();
        Ok(remotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RefError;
    use crate::fs::FsRefStore;
    use crate::memory::InMemoryRefStore;
    use cairn_types::ObjectId;

    fn with_each_store(check: impl Fn(&dyn RefStore)) {
        check(&InMemoryRefStore::new());
        let dir = tempfile::tempdir().unwrap();
        check(&FsRefStore::open(dir.path()).unwrap());
    }

    fn direct(name: &str) -> Ref {
        Ref::new_direct(name, ObjectId::from_hash([7; 32]))
    }

    #[test]
    fn stores_agree_on_ref_below_existing_ref() {
        with_each_store(|store| {
            store.write_ref(&direct("refs/heads/a")).unwrap();
            let err = store.write_ref(&direct("refs/heads/a/b")).unwrap_err();
            assert!(matches!(err, RefError::InvalidName { .. }), "{err}");
            assert!(store.read_ref("refs/heads/a/b").unwrap().is_none());
            assert_eq!(store.branches().unwrap(), vec![direct("refs/heads/a")]);
        });
    }

    #[test]
    fn stores_agree_on_ref_over_existing_namespace() {
        with_each_store(|store| {
            store.write_ref(&direct("refs/heads/a/b")).unwrap();
            let err = store.write_ref(&direct("refs/heads/a")).unwrap_err();
            assert!(matches!(err, RefError::InvalidName { .. }), "{err}");
            assert!(store.read_ref("refs/heads/a").unwrap().is_none());

            store.delete_ref("refs/heads/a/b").unwrap();
            store.write_ref(&direct("refs/heads/a")).unwrap();
        });
    }

    #[test]
    fn stores_agree_on_symbolic_targets_with_spaces() {
        with_each_store(|store| {
            let alias = Ref::new_symbolic("refs/heads/alias", "refs/heads/ x ");
            store.write_ref(&alias).unwrap();
            assert_eq!(store.read_ref("refs/heads/alias").unwrap(), Some(alias.clone()));
        });
    }
}
