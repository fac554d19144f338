//! Reference handles.
//!
//! A [`Reference`] is a snapshot of one ref read from the repository's ref
//! store. It borrows the repository, so it cannot outlive it; `copy` and
//! `resolve` hand back new, independent handles.

use std::cmp::Ordering;
use std::fmt;

use cairn_refs::{is_valid_name, Ref, RefTarget, ReferenceType};
use cairn_store::ObjectKind;
use cairn_types::ObjectId;
use tracing::{debug, warn};

use crate::error::{RepoError, RepoResult};
use crate::object::ObjectHandle;
use crate::repository::Repository;

/// A named reference in a repository.
#[derive(Clone)]
pub struct Reference<'repo> {
    repo: &'repo Repository,
    inner: Ref,
}

impl<'repo> Reference<'repo> {
    pub(crate) fn new(repo: &'repo Repository, inner: Ref) -> Self {
        Self { repo, inner }
    }

    /// Returns `true` if `name` is a well-formed reference name.
    pub fn is_valid_name(name: &str) -> bool {
        is_valid_name(name)
    }

    /// Full reference name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Name with the namespace prefix removed, or the full name.
    pub fn shorthand_name(&self) -> &str {
        self.inner.shorthand()
    }

    /// The repository this reference belongs to.
    pub fn owner(&self) -> &'repo Repository {
        self.repo
    }

    pub fn ref_type(&self) -> ReferenceType {
        self.inner.ref_type()
    }

    pub fn is_branch(&self) -> bool {
        self.inner.is_branch()
    }

    pub fn is_note(&self) -> bool {
        self.inner.is_note()
    }

    pub fn is_remote(&self) -> bool {
        self.inner.is_remote()
    }

    pub fn is_tag(&self) -> bool {
        self.inner.is_tag()
    }

    /// Total order over references.
    ///
    /// `Equal` exactly when both name and target match.
    pub fn compare(&self, other: &Reference<'_>) -> Ordering {
        self.inner.cmp(&other.inner)
    }

    /// An independent handle to the same name and target.
    pub fn copy(&self) -> Reference<'repo> {
        self.clone()
    }

    /// Object id of a direct reference.
    pub fn target(&self) -> RepoResult<ObjectId> {
        match &self.inner.target {
            RefTarget::Direct(id) => Ok(*id),
            RefTarget::Symbolic(target) => Err(RepoError::InvalidOperation(format!(
                "{} is symbolic (-> {target}); resolve it first",
                self.inner.name
            ))),
        }
    }

    /// Target name of a symbolic reference.
    pub fn symbolic_target(&self) -> RepoResult<&str> {
        match &self.inner.target {
            RefTarget::Symbolic(target) => Ok(target),
            RefTarget::Direct(_) => Err(RepoError::InvalidOperation(format!(
                "{} is a direct reference",
                self.inner.name
            ))),
        }
    }

    /// Follow symbolic links to the terminal direct reference.
    ///
    /// A direct reference resolves to a copy of itself. Fails with
    /// `ResolutionCycle` once more than `max_symbolic_depth` links have been
    /// followed, and with `NotFound` when a link names a missing reference.
    pub fn resolve(&self) -> RepoResult<Reference<'repo>> {
        let max_depth = self.repo.config().max_symbolic_depth;
        let mut current = self.inner.clone();
        let mut depth = 0;

        while let RefTarget::Symbolic(next) = &current.target {
            if depth == max_depth {
                warn!(name = %self.inner.name, depth, "symbolic reference chain too deep");
                return Err(RepoError::ResolutionCycle {
                    name: self.inner.name.clone(),
                    depth,
                });
            }
            depth += 1;
            debug!(from = %current.name, to = %next, depth, "following symbolic reference");
            current = self
                .repo
                .refs()
                .read_ref(next)?
                .ok_or_else(|| RepoError::NotFound(format!("reference {next}")))?;
        }
        Ok(Reference::new(self.repo, current))
    }

    /// Resolve, then peel the target until an object of `kind` is reached.
    pub fn peel_until(&self, kind: ObjectKind) -> RepoResult<ObjectHandle<'repo>> {
        let id = self.resolve()?.target()?;
        self.repo.find_object(&id)?.peel(kind)
    }

    /// Id of the object this reference ultimately denotes, with every
    /// annotated tag peeled away.
    pub fn peeled_target(&self) -> RepoResult<ObjectId> {
        let id = self.resolve()?.target()?;
        Ok(self.repo.find_object(&id)?.peel_tags()?.id())
    }

    /// Point a direct reference at `id`, returning the updated handle.
    pub fn set_target(&self, id: ObjectId) -> RepoResult<Reference<'repo>> {
        self.target()?;
        self.repo.create_reference(&self.inner.name, id, true)
    }

    /// Remove this reference from the repository.
    pub fn delete(self) -> RepoResult<()> {
        if !self.repo.refs().delete_ref(&self.inner.name)? {
            return Err(RepoError::NotFound(format!(
                "reference {}",
                self.inner.name
            )));
        }
        debug!(name = %self.inner.name, "deleted reference");
        Ok(())
    }
}

impl PartialEq for Reference<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Eq for Reference<'_> {}

impl PartialOrd for Reference<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Reference<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl fmt::Debug for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reference")
            .field("name", &self.inner.name)
            .field("target", &self.inner.target)
            .finish()
    }
}

impl fmt::Display for Reference<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner.target {
            RefTarget::Direct(id) => write!(f, "{} {}", id, self.inner.name),
            RefTarget::Symbolic(target) => write!(f, "ref: {} {}", target, self.inner.name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn repo_with_blob() -> (Repository, ObjectId) {
        let repo = Repository::in_memory().unwrap();
        let id = repo.write_blob(b"tip").unwrap();
        (repo, id)
    }

    #[test]
    fn accessors_and_classification() {
        let (repo, id) = repo_with_blob();
        let r = repo.create_reference("refs/heads/feature/x", id, false).unwrap();
        assert_eq!(r.name(), "refs/heads/feature/x");
        assert_eq!(r.shorthand_name(), "feature/x");
        assert!(r.is_branch() && !r.is_tag() && !r.is_remote() && !r.is_note());
        assert_eq!(r.ref_type(), ReferenceType::Direct);
        assert!(std::ptr::eq(r.owner(), &repo));
        assert_eq!(r.to_string(), format!("{id} refs/heads/feature/x"));

        let head = repo.head().unwrap();
        assert_eq!(head.ref_type(), ReferenceType::Symbolic);
        assert_eq!(head.shorthand_name(), "HEAD");
        assert!(Reference::is_valid_name("ORIG_HEAD"));
        assert!(!Reference::is_valid_name("orig_head"));
    }

    #[test]
    fn target_on_symbolic_is_invalid_operation() {
        let (repo, _) = repo_with_blob();
        let head = repo.head().unwrap();
        assert_eq!(head.target().unwrap_err().kind(), ErrorKind::InvalidOperation);

        let (repo, id) = repo_with_blob();
        let direct = repo.create_reference("refs/heads/main", id, false).unwrap();
        assert_eq!(
            direct.symbolic_target().unwrap_err().kind(),
            ErrorKind::InvalidOperation
        );
    }

    #[test]
    fn resolve_direct_returns_copy() {
        let (repo, id) = repo_with_blob();
        let direct = repo.create_reference("refs/heads/main", id, false).unwrap();
        let resolved = direct.resolve().unwrap();
        assert_eq!(resolved.compare(&direct), Ordering::Equal);
        assert_eq!(resolved.target().unwrap(), id);
    }

    #[test]
    fn resolve_respects_configured_depth() {
        let (repo, id) = repo_with_blob();
        repo.create_reference("refs/heads/r0", id, false).unwrap();
        for i in 1..=5 {
            repo.create_symbolic_reference(
                &format!("refs/heads/r{i}"),
                &format!("refs/heads/r{}", i - 1),
                false,
            )
            .unwrap();
        }
        // Five links is exactly the default bound.
        let r5 = repo.find_reference("refs/heads/r5").unwrap();
        assert_eq!(r5.resolve().unwrap().target().unwrap(), id);

        repo.create_symbolic_reference("refs/heads/r6", "refs/heads/r5", false)
            .unwrap();
        let r6 = repo.find_reference("refs/heads/r6").unwrap();
        let err = r6.resolve().unwrap_err();
        assert!(matches!(err, RepoError::ResolutionCycle { depth: 5, .. }));
    }

    #[test]
    fn resolve_missing_link_is_not_found() {
        let (repo, _) = repo_with_blob();
        repo.create_symbolic_reference("refs/heads/dangling", "refs/heads/gone", false)
            .unwrap();
        let r = repo.find_reference("refs/heads/dangling").unwrap();
        assert_eq!(r.resolve().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn copy_is_independent() {
        let (repo, id) = repo_with_blob();
        let original = repo.create_reference("refs/tags/v1", id, false).unwrap();
        let copy = original.copy();
        assert_eq!(copy.compare(&original), Ordering::Equal);
        drop(copy);
        assert_eq!(original.target().unwrap(), id);
        assert_eq!(original, original.copy());
    }

    #[test]
    fn compare_distinguishes_name_and_target() {
        let (repo, id) = repo_with_blob();
        let other = repo.write_blob(b"other").unwrap();
        let a = repo.create_reference("refs/heads/a", id, false).unwrap();
        let b = repo.create_reference("refs/heads/b", id, false).unwrap();
        let a2 = a.set_target(other).unwrap();
        assert_ne!(a.compare(&b), Ordering::Equal);
        assert_ne!(a.compare(&a2), Ordering::Equal);
        assert_eq!(a.compare(&b), b.compare(&a).reverse());
    }

    #[test]
    fn set_target_on_symbolic_fails() {
        let (repo, id) = repo_with_blob();
        let head = repo.head().unwrap();
        assert_eq!(head.set_target(id).unwrap_err().kind(), ErrorKind::InvalidOperation);
    }

    #[test]
    fn delete_consumes_and_reports_missing() {
        let (repo, id) = repo_with_blob();
        let r = repo.create_reference("refs/heads/tmp", id, false).unwrap();
        let stale = r.copy();
        r.delete().unwrap();
        assert_eq!(
            repo.find_reference("refs/heads/tmp").unwrap_err().kind(),
            ErrorKind::NotFound
        );
        assert_eq!(stale.delete().unwrap_err().kind(), ErrorKind::NotFound);
    }

    #[test]
    fn peeled_target_of_plain_ref_is_its_target() {
        let (repo, id) = repo_with_blob();
        let r = repo.create_reference("refs/heads/main", id, false).unwrap();
        assert_eq!(r.peeled_target().unwrap(), id);
        assert_eq!(r.peel_until(ObjectKind::Blob).unwrap().id(), id);
        assert_eq!(
            r.peel_until(ObjectKind::Tree).unwrap_err().kind(),
            ErrorKind::PeelingFailure
        );
    }
}
