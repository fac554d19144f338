//! Decoded object handles and peeling.

use cairn_store::{Blob, Commit, Object, ObjectKind, Tag};
use cairn_types::ObjectId;
use tracing::debug;

use crate::error::{RepoError, RepoResult};
use crate::repository::Repository;
use crate::tree::TreeHandle;

/// A decoded object together with its id, borrowed from a repository.
#[derive(Clone, Debug)]
pub struct ObjectHandle<'repo> {
    repo: &'repo Repository,
    id: ObjectId,
    object: Object,
}

impl<'repo> ObjectHandle<'repo> {
    pub(crate) fn new(repo: &'repo Repository, id: ObjectId, object: Object) -> Self {
        Self { repo, id, object }
    }

    /// Content address of this object.
    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn kind(&self) -> ObjectKind {
        self.object.kind()
    }

    /// The decoded object.
    pub fn object(&self) -> &Object {
        &self.object
    }

    pub fn into_object(self) -> Object {
        self.object
    }

    /// The owning repository.
    pub fn owner(&self) -> &'repo Repository {
        self.repo
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match &self.object {
            Object::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match &self.object {
            Object::Commit(commit) => Some(commit),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match &self.object {
            Object::Tag(tag) => Some(tag),
            _ => None,
        }
    }

    /// Convert into a tree handle; `InvalidOperation` for other kinds.
    pub fn into_tree(self) -> RepoResult<TreeHandle<'repo>> {
        match self.object {
            Object::Tree(tree) => Ok(TreeHandle::new(self.repo, self.id, tree)),
            other => Err(RepoError::InvalidOperation(format!(
                "object {} is a {}, not a tree",
                self.id,
                other.kind()
            ))),
        }
    }

    /// Peel towards `kind`: tags to their target, commits to their tree.
    ///
    /// Returns this object unchanged when it already has the requested kind.
    /// Fails with `PeelingFailure` when peeling stops short of `kind`.
    pub fn peel(&self, kind: ObjectKind) -> RepoResult<ObjectHandle<'repo>> {
        let mut current = self.clone();
        while current.kind() != kind {
            let next = current.object.peel_step().ok_or(RepoError::PeelingFailure {
                id: self.id,
                kind,
            })?;
            debug!(from = %current.id, to = %next, "peel step");
            current = self.repo.find_object(&next)?;
        }
        Ok(current)
    }

    /// Follow annotated tags until a non-tag object is reached.
    pub fn peel_tags(&self) -> RepoResult<ObjectHandle<'repo>> {
        let mut current = self.clone();
        while let Object::Tag(tag) = &current.object {
            let next = tag.target;
            current = self.repo.find_object(&next)?;
        }
        Ok(current)
    }
}
