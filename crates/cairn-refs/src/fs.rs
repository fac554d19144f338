//! Filesystem reference store with one file per ref.
//!
//! A ref named `refs/heads/main` lives at `<root>/refs/heads/main`; a
//! top-level ref such as `HEAD` lives at `<root>/HEAD`. Each file holds a
//! single line:
//!
//! ```text
//! <64 hex chars>\n        direct ref
//! ref: <target name>\n    symbolic ref
//! ```
//!
//! Updates are written to a `.lock` temp file beside the target and renamed
//! into place.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cairn_types::ObjectId;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::error::{RefError, Result};
use crate::names::{is_valid_name, validate_name, REFS_DIR};
use crate::traits::RefStore;
use crate::types::{Ref, RefTarget};

const SYMBOLIC_PREFIX: &str = "ref: ";
const LOCK_SUFFIX: &str = ".lock";

/// Filesystem-backed [`RefStore`].
#[derive(Debug, Clone)]
pub struct FsRefStore {
    root: PathBuf,
}

impl FsRefStore {
    /// Open a ref store rooted at `root`, creating `root/refs` if needed.
    pub fn open(root: &Path) -> Result<Self> {
        fs::create_dir_all(root.join(REFS_DIR))?;
        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    /// Directory the store lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// File path backing the ref `name`.
    pub fn ref_path(&self, name: &str) -> PathBuf {
        name.split('/')
            .fold(self.root.clone(), |path, component| path.join(component))
    }

    fn check_components(name: &str) -> Result<()> {
        let bad = name
            .split('/')
            .find(|c| c.is_empty() || c.starts_with('.') || c.ends_with(LOCK_SUFFIX));
        match bad {
            None => Ok(()),
            Some(component) => Err(RefError::InvalidName {
                name: name.to_string(),
                reason: format!("component {component:?} cannot be stored on disk"),
            }),
        }
    }

    fn parse(name: &str, contents: &str) -> Result<Ref> {
        let line = contents.trim_end_matches(['\n', '\r']);
        let corrupt = |reason: String| RefError::Corrupt {
            name: name.to_string(),
            reason,
        };
        if let Some(target) = line.strip_prefix(SYMBOLIC_PREFIX) {
            if !is_valid_name(target) {
                return Err(corrupt(format!("invalid symbolic target {target:?}")));
            }
            return Ok(Ref::new_symbolic(name, target));
        }
        let id = ObjectId::from_hex(line)
            .map_err(|e| corrupt(format!("expected object id: {e}")))?;
        Ok(Ref::new_direct(name, id))
    }

    fn serialize(reference: &Ref) -> String {
        match &reference.target {
            RefTarget::Direct(id) => format!("{}\n", id.to_hex()),
            RefTarget::Symbolic(target) => format!("{SYMBOLIC_PREFIX}{target}\n"),
        }
    }

    /// Removes empty directories between `path` and the `refs/` directory.
    fn prune_empty_parents(&self, path: &Path) {
        let stop = self.root.join(REFS_DIR);
        let mut dir = path.parent();
        while let Some(current) = dir {
            if current == stop || current == self.root || !current.starts_with(&stop) {
                break;
            }
            if fs::remove_dir(current).is_err() {
                break;
            }
            debug!(dir = ?current, "pruned empty ref directory");
            dir = current.parent();
        }
    }

    fn top_level_names(&self) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if !name.contains('/') && is_valid_name(name) {
                    names.push(name.to_string());
                }
            }
        }
        Ok(names)
    }

    fn hierarchical_names(&self) -> Result<Vec<String>> {
        let refs_dir = self.root.join(REFS_DIR);
        if !refs_dir.is_dir() {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        for entry in WalkDir::new(&refs_dir).min_depth(1) {
            let entry = entry.map_err(io::Error::from)?;
            if !entry.file_type().is_file() {
                continue;
            }
            let file_name = entry.file_name().to_string_lossy();
            if file_name.starts_with('.') || file_name.ends_with(LOCK_SUFFIX) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let components: Option<Vec<&str>> = relative
                .components()
                .map(|c| c.as_os_str().to_str())
                .collect();
            match components {
                Some(parts) => names.push(parts.join("/")),
                None => warn!(path = ?entry.path(), "skipping non-utf8 ref path"),
            }
        }
        Ok(names)
    }
}

impl RefStore for FsRefStore {
    fn read_ref(&self, name: &str) -> Result<Option<Ref>> {
        if !is_valid_name(name) || Self::check_components(name).is_err() {
            return Ok(None);
        }
        let path = self.ref_path(name);
        if path.is_dir() {
            return Ok(None);
        }
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Self::parse(name, &contents).map(Some)
    }

    fn write_ref(&self, reference: &Ref) -> Result<()> {
        let name = &reference.name;
        validate_name(name)?;
        Self::check_components(name)?;

        let path = self.ref_path(name);
        if path.is_dir() {
            return Err(RefError::InvalidName {
                name: name.clone(),
                reason: "a ref namespace with this name already exists".into(),
            });
        }
        let mut ancestor = path.parent();
        while let Some(dir) = ancestor {
            if dir == self.root {
                break;
            }
            if dir.is_file() {
                return Err(RefError::InvalidName {
                    name: name.clone(),
                    reason: format!("conflicts with existing ref at {}", dir.display()),
                });
            }
            ancestor = dir.parent();
        }

        let parent = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "ref path has no parent"))?;
        fs::create_dir_all(parent)?;

        let mut tmp = tempfile::Builder::new()
            .prefix(".")
            .suffix(LOCK_SUFFIX)
            .tempfile_in(parent)?;
        tmp.write_all(Self::serialize(reference).as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| RefError::Io(e.error))?;

        debug!(%name, target = ?reference.target, "wrote ref file");
        Ok(())
    }

    fn delete_ref(&self, name: &str) -> Result<bool> {
        if !is_valid_name(name) || Self::check_components(name).is_err() {
            return Ok(false);
        }
        let path = self.ref_path(name);
        if path.is_dir() {
            return Ok(false);
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(name, "deleted ref file");
                self.prune_empty_parents(&path);
                Ok(true)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn list_refs(&self, prefix: &str) -> Result<Vec<Ref>> {
        let mut names = self.top_level_names()?;
        names.extend(self.hierarchical_names()?);
        names.retain(|name| name.starts_with(prefix));
        names.sort();

        let mut refs = Vec::with_capacity(names.len());
        for name in names {
            if let Some(reference) = self.read_ref(&name)? {
                refs.push(reference);
            }
        }
        Ok(refs)
    }
}
