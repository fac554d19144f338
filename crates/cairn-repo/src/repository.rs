use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use cairn_refs::names::{HEAD, HEADS_DIR, TAGS_DIR};
use cairn_refs::{
    validate_name, FsRefStore, InMemoryRefStore, Ref, RefStore, ReferenceFilter,
};
use cairn_store::{
    Blob, Commit, InMemoryObjectStore, LooseObjectStore, Object, ObjectKind, ObjectStore,
    StoredObject, Tag, Tree,
};
use cairn_types::ObjectId;
use tracing::{debug, info};

use crate::config::{RepositoryConfig, CONFIG_FILE};
use crate::error::{RepoError, RepoResult};
use crate::object::ObjectHandle;
use crate::reference::Reference;
use crate::tree::TreeHandle;

/// Branch that `HEAD` names in a freshly created repository.
pub const DEFAULT_BRANCH: &str = "refs/heads/main";

/// A repository: an object store and a reference store under one config.
///
/// Every handle produced here ([`Reference`], [`TreeHandle`],
/// [`ObjectHandle`]) borrows the repository and cannot outlive it.
pub struct Repository {
    path: Option<PathBuf>,
    objects: Box<dyn ObjectStore>,
    refs: Box<dyn RefStore>,
    config: RepositoryConfig,
}

impl Repository {
    /// Create an empty in-memory repository with `HEAD -> refs/heads/main`.
    pub fn in_memory() -> RepoResult<Self> {
        let repo = Self::with_stores(
            Box::new(InMemoryObjectStore::new()),
            Box::new(InMemoryRefStore::new()),
            RepositoryConfig::default(),
        )?;
        repo.refs.write_ref(&Ref::new_symbolic(HEAD, DEFAULT_BRANCH))?;
        Ok(repo)
    }

    /// Assemble a repository from arbitrary store backends.
    pub fn with_stores(
        objects: Box<dyn ObjectStore>,
        refs: Box<dyn RefStore>,
        config: RepositoryConfig,
    ) -> RepoResult<Self> {
        config.validate()?;
        Ok(Self {
            path: None,
            objects,
            refs,
            config,
        })
    }

    /// Create (or reinitialize) an on-disk repository at `path`.
    ///
    /// Existing objects, refs and config are left untouched.
    pub fn init(path: &Path) -> RepoResult<Self> {
        fs::create_dir_all(path.join("objects"))?;
        fs::create_dir_all(path.join(HEADS_DIR))?;
        fs::create_dir_all(path.join(TAGS_DIR))?;

        let config_path = path.join(CONFIG_FILE);
        if !config_path.exists() {
            RepositoryConfig::default().save(&config_path)?;
        }
        let refs = FsRefStore::open(path)?;
        if refs.read_ref(HEAD)?.is_none() {
            refs.write_ref(&Ref::new_symbolic(HEAD, DEFAULT_BRANCH))?;
        }
        info!(path = %path.display(), "initialized repository");
        Self::open(path)
    }

    /// Open an existing on-disk repository.
    pub fn open(path: &Path) -> RepoResult<Self> {
        if !path.join("objects").is_dir() {
            return Err(RepoError::NotFound(format!(
                "repository at {}",
                path.display()
            )));
        }
        let config = RepositoryConfig::load(&path.join(CONFIG_FILE))?;
        let objects = LooseObjectStore::open(path)?
            .with_compression_level(config.compression_level)
            .with_verify_on_read(config.verify_on_read);
        let refs = FsRefStore::open(path)?;

        let mut repo = Self::with_stores(Box::new(objects), Box::new(refs), config)?;
        repo.path = Some(path.to_path_buf());
        debug!(path = %path.display(), "opened repository");
        Ok(repo)
    }

    /// Directory of an on-disk repository; `None` when in memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Active configuration.
    pub fn config(&self) -> &RepositoryConfig {
        &self.config
    }

    /// The underlying object store.
    pub fn objects(&self) -> &dyn ObjectStore {
        self.objects.as_ref()
    }

    /// The underlying reference store.
    pub fn refs(&self) -> &dyn RefStore {
        self.refs.as_ref()
    }

    // ---- Objects ----

    fn write_stored(&self, object: &StoredObject) -> RepoResult<ObjectId> {
        Ok(self.objects.write(object)?)
    }

    /// Store raw bytes as a blob.
    pub fn write_blob(&self, data: &[u8]) -> RepoResult<ObjectId> {
        self.write_stored(&Blob::new(data.to_vec()).to_stored_object())
    }

    /// Store a tree.
    pub fn write_tree(&self, tree: &Tree) -> RepoResult<ObjectId> {
        self.write_stored(&tree.to_stored_object())
    }

    /// Store a commit. Its root tree must already be present.
    pub fn write_commit(&self, commit: &Commit) -> RepoResult<ObjectId> {
        self.require_kind(&commit.tree, ObjectKind::Tree)?;
        self.write_stored(&commit.to_stored_object()?)
    }

    /// Store an annotated tag. Its target must already be present with the
    /// recorded kind.
    pub fn write_tag(&self, tag: &Tag) -> RepoResult<ObjectId> {
        self.require_kind(&tag.target, tag.target_kind)?;
        self.write_stored(&tag.to_stored_object()?)
    }

    fn fetch(&self, id: &ObjectId) -> RepoResult<StoredObject> {
        if id.is_null() {
            return Err(RepoError::NotFound("null object id".into()));
        }
        Ok(self.objects.fetch(id)?)
    }

    fn require_kind(&self, id: &ObjectId, kind: ObjectKind) -> RepoResult<StoredObject> {
        let stored = self.fetch(id)?;
        if stored.kind != kind {
            return Err(RepoError::InvalidOperation(format!(
                "object {id} is a {}, not a {kind}",
                stored.kind
            )));
        }
        Ok(stored)
    }

    /// Look up and decode any object.
    pub fn find_object(&self, id: &ObjectId) -> RepoResult<ObjectHandle<'_>> {
        let object = Object::decode(&self.fetch(id)?)?;
        Ok(ObjectHandle::new(self, *id, object))
    }

    /// Look up a blob.
    pub fn find_blob(&self, id: &ObjectId) -> RepoResult<Blob> {
        Ok(Blob::from_stored_object(
            &self.require_kind(id, ObjectKind::Blob)?,
        )?)
    }

    /// Look up a tree.
    pub fn find_tree(&self, id: &ObjectId) -> RepoResult<TreeHandle<'_>> {
        let tree = Tree::from_stored_object(&self.require_kind(id, ObjectKind::Tree)?)?;
        Ok(TreeHandle::new(self, *id, tree))
    }

    /// Look up a commit.
    pub fn find_commit(&self, id: &ObjectId) -> RepoResult<Commit> {
        Ok(Commit::from_stored_object(
            &self.require_kind(id, ObjectKind::Commit)?,
        )?)
    }

    /// Look up an annotated tag.
    pub fn find_tag(&self, id: &ObjectId) -> RepoResult<Tag> {
        Ok(Tag::from_stored_object(
            &self.require_kind(id, ObjectKind::Tag)?,
        )?)
    }

    // ---- References ----

    /// Look up a reference by full name.
    pub fn find_reference(&self, name: &str) -> RepoResult<Reference<'_>> {
        validate_name(name)?;
        let inner = self
            .refs
            .read_ref(name)?
            .ok_or_else(|| RepoError::NotFound(format!("reference {name}")))?;
        Ok(Reference::new(self, inner))
    }

    fn check_overwrite(&self, name: &str, force: bool) -> RepoResult<()> {
        validate_name(name)?;
        if !force && self.refs.read_ref(name)?.is_some() {
            return Err(RepoError::AlreadyExists(format!("reference {name}")));
        }
        Ok(())
    }

    /// Create a direct reference to an existing object.
    ///
    /// Fails with `AlreadyExists` unless `force` is set.
    pub fn create_reference(
        &self,
        name: &str,
        id: ObjectId,
        force: bool,
    ) -> RepoResult<Reference<'_>> {
        self.check_overwrite(name, force)?;
        if id.is_null() || !self.objects.exists(&id)? {
            return Err(RepoError::NotFound(format!("object {id}")));
        }
        let inner = Ref::new_direct(name, id);
        self.refs.write_ref(&inner)?;
        Ok(Reference::new(self, inner))
    }

    /// Create a symbolic reference. The target need not exist yet.
    pub fn create_symbolic_reference(
        &self,
        name: &str,
        target: &str,
        force: bool,
    ) -> RepoResult<Reference<'_>> {
        self.check_overwrite(name, force)?;
        validate_name(target)?;
        let inner = Ref::new_symbolic(name, target);
        self.refs.write_ref(&inner)?;
        Ok(Reference::new(self, inner))
    }

    /// All references whose type passes `filter`, sorted by name.
    pub fn references(&self, filter: ReferenceFilter) -> RepoResult<Vec<Reference<'_>>> {
        self.references_with_prefix("", filter)
    }

    /// References under `prefix` whose type passes `filter`, sorted by name.
    pub fn references_with_prefix(
        &self,
        prefix: &str,
        filter: ReferenceFilter,
    ) -> RepoResult<Vec<Reference<'_>>> {
        Ok(self
            .refs
            .list_refs(prefix)?
            .into_iter()
            .filter(|r| filter.matches(r.ref_type()))
            .map(|r| Reference::new(self, r))
            .collect())
    }

    /// Branch references.
    pub fn branches(&self) -> RepoResult<Vec<Reference<'_>>> {
        self.references_with_prefix(HEADS_DIR, ReferenceFilter::ALL)
    }

    /// Tag references.
    pub fn tags(&self) -> RepoResult<Vec<Reference<'_>>> {
        self.references_with_prefix(TAGS_DIR, ReferenceFilter::ALL)
    }

    /// The `HEAD` reference.
    pub fn head(&self) -> RepoResult<Reference<'_>> {
        self.find_reference(HEAD)
    }

    /// Resolve `name` all the way to an object id.
    pub fn reference_name_to_id(&self, name: &str) -> RepoResult<ObjectId> {
        self.find_reference(name)?.resolve()?.target()
    }
}

impl fmt::Debug for Repository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("path", &self.path)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
