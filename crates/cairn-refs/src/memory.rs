//! In-memory reference store for testing and ephemeral use.
//!
//! [`InMemoryRefStore`] stores all refs in a `BTreeMap` protected by a
//! `RwLock`. It implements the full [`RefStore`] trait and is suitable for
//! unit tests and short-lived processes.

use std::collections::BTreeMap;
use std::sync::RwLock;

use tracing::debug;

use crate::error::{RefError, Result};
use crate::names::validate_name;
use crate::traits::RefStore;
use crate::types::Ref;

/// An in-memory implementation of [`RefStore`].
///
/// All data lives in a `BTreeMap` behind a `RwLock`, so listings come out
/// sorted for free. Data is lost when the store is dropped.
#[derive(Debug)]
pub struct InMemoryRefStore {
    refs: RwLock<BTreeMap<String, Ref>>,
}

impl InMemoryRefStore {
    /// Create a new empty ref store.
    pub fn new() -> Self {
        Self {
            refs: RwLock::new(BTreeMap::new()),
        }
    }
}

impl Default for InMemoryRefStore {
    fn default() -> Self {
        Self::new()
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> RefError {
    RefError::Storage(format!("lock poisoned: {e}"))
}

/// A ref cannot sit where another ref's namespace is, nor below another ref.
fn check_namespace(refs: &BTreeMap<String, Ref>, name: &str) -> Result<()> {
    let conflict = |reason: String| RefError::InvalidName {
        name: name.to_string(),
        reason,
    };
    let mut ancestors = name.match_indices('/').map(|(i, _)| &name[..i]);
    if let Some(parent) = ancestors.find(|prefix| refs.contains_key(*prefix)) {
        return Err(conflict(format!("conflicts with existing ref {parent}")));
    }
    let namespace = format!("{name}/");
    if let Some((child, _)) = refs.range(namespace.clone()..).next() {
        if child.starts_with(&namespace) {
            return Err(conflict(format!(
                "a ref namespace with this name already exists ({child})"
            )));
        }
    }
    Ok(())
}

impl RefStore for InMemoryRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs.get(name).cloned())
    }

    fn write_ref(&self, reference: &Ref) -> Result<()> {
        validate_name(&reference.name)?;
        let mut refs = self.refs.write().map_err(poisoned)?;
        check_namespace(&refs, &reference.name)?;
        debug!(name = %reference.name, target = ?reference.target, "write ref");
        refs.insert(reference.name.clone(), reference.clone());
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        let mut refs = self.refs.write().map_err(poisoned)?;
        let removed = refs.remove(name).is_some();
        if removed {
            debug!(name, "deleted ref");
        }
        Ok(removed)
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<Ref>> {
        let refs = self.refs.read().map_err(poisoned)?;
        Ok(refs
            .range(prefix.to_string()..)
            .take_while(|(name, _)| name.starts_with(prefix))
            .map(|(_, r)| r.clone())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cairn_types::ObjectId;

    fn oid(n: u8) -> ObjectId {
        ObjectId::from_hash([n; 32])
    }

    fn branch(name: &str, n: u8) -> Ref {
        Ref::new_direct(format!("refs/heads/{name}"), oid(n))
    }

    #[test]
    fn create_and_read_branch_ref() {
        let store = InMemoryRefStore::new();
        let main = branch("main", 1);
        store.write_ref(&main).unwrap();

        let read = store.read_ref("refs/heads/main").unwrap().unwrap();
        assert_eq!(read, main);
        assert_eq!(read.target_id(), Some(oid(1)));
    }

    #[test]
    fn read_nonexistent_ref_returns_none() {
        let store = InMemoryRefStore::new();
        assert!(store.read_ref("refs/heads/nope").unwrap().is_none());
    }

    #[test]
    fn delete_ref() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("feature", 2)).unwrap();
        assert!(store.delete_ref("refs/heads/feature").unwrap());
        assert!(store.read_ref("refs/heads/feature").unwrap().is_none());
        assert!(!store.delete_ref("refs/heads/feature").unwrap());
    }

    #[test]
    fn update_overwrites_target() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("main", 1)).unwrap();
        store.write_ref(&branch("main", 2)).unwrap();
        let read = store.read_ref("refs/heads/main").unwrap().unwrap();
        assert_eq!(read.target_id(), Some(oid(2)));
    }

    #[test]
    fn symbolic_ref_roundtrip() {
        let store = InMemoryRefStore::new();
        store
            .write_ref(&Ref::new_symbolic("HEAD", "refs/heads/main"))
            .unwrap();
        let head = store.read_ref("HEAD").unwrap().unwrap();
        assert_eq!(head.symbolic_target(), Some("refs/heads/main"));
    }

    #[test]
    fn reject_invalid_name_on_write() {
        let store = InMemoryRefStore::new();
        let err = store
            .write_ref(&Ref::new_direct("refs/heads/bad..name", oid(1)))
            .unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));
        assert!(store.list_refs("").unwrap().is_empty());
    }

    #[test]
    fn namespace_conflicts_are_rejected() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("feature", 1)).unwrap();
        let err = store.write_ref(&branch("feature/auth", 2)).unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));

        store
            .write_ref(&Ref::new_direct("refs/tags/v1/final", oid(3)))
            .unwrap();
        let err = store
            .write_ref(&Ref::new_direct("refs/tags/v1", oid(4)))
            .unwrap_err();
        assert!(matches!(err, RefError::InvalidName { .. }));

        store.write_ref(&branch("feature", 5)).unwrap();
        store.write_ref(&branch("feature-two/x", 6)).unwrap();
        assert_eq!(store.branches().unwrap().len(), 2);
    }

    #[test]
    fn poisoned_lock_is_a_storage_error() {
        let store = std::sync::Arc::new(InMemoryRefStore::new());
        let holder = std::sync::Arc::clone(&store);
        let _ = std::thread::spawn(move || {
            let _guard = holder.refs.write().unwrap();
            panic!("poison the ref map");
        })
        .join();

        assert!(matches!(
            store.read_ref("HEAD").unwrap_err(),
            RefError::Storage(_)
        ));
        assert!(matches!(
            store.write_ref(&branch("main", 1)).unwrap_err(),
            RefError::Storage(_)
        ));
    }

    #[test]
    fn list_by_prefix_is_sorted() {
        let store = InMemoryRefStore::new();
        store.write_ref(&branch("zeta", 1)).unwrap();
        store.write_ref(&branch("alpha", 2)).unwrap();
        store.write_ref(&branch("feature/auth", 3)).unwrap();
        store
            .write_ref(&Ref::new_direct("refs/tags/v1.0", oid(4)))
            .unwrap();
        store
            .write_ref(&Ref::new_symbolic("HEAD", "refs/heads/alpha"))
            .unwrap();

        let names: Vec<String> = store
            .branches()
            .unwrap()
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(
            names,
            vec![
                "refs/heads/alpha",
                "refs/heads/feature/auth",
                "refs/heads/zeta"
            ]
        );
        assert_eq!(store.tags().unwrap().len(), 1);
        assert_eq!(store.list_refs("").unwrap().len(), 5);
        assert_eq!(store.list_refs("").unwrap()[0].name, "HEAD");
    }

    #[test]
    fn list_remotes() {
        let store = InMemoryRefStore::new();
        for name in [
            "refs/remotes/origin/main",
            "refs/remotes/origin/dev",
            "refs/remotes/upstream/main",
        ] {
            store.write_ref(&Ref::new_direct(name, oid(1))).unwrap();
        }
        assert_eq!(store.remotes().unwrap(), vec!["origin", "upstream"]);
    }
}
