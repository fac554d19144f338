//! On-disk object store with one compressed file per object.
//!
//! Layout under the store root:
//!
//! ```text
//! objects/<first 2 hex chars>/<remaining 62 hex chars>
//! ```
//!
//! Each file is zstd-compressed and holds
//!
//! ```text
//! <kind> SP <decimal length> NUL <data>
//! ```
//!
//! Writes go through a temporary file in the target directory followed by an
//! atomic rename, so readers never observe a partially written object.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use cairn_types::ObjectId;
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::error::{StoreError, StoreResult};
use crate::object::{ObjectKind, StoredObject};
use crate::traits::ObjectStore;

/// Default zstd compression level for new objects.
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 3;

/// Filesystem-backed loose object store.
#[derive(Debug)]
pub struct LooseObjectStore {
    objects_dir: PathBuf,
    compression_level: i32,
    verify_on_read: bool,
}

impl LooseObjectStore {
    /// Open (or create) a loose store rooted at `root`.
    ///
    /// Objects live under `root/objects`.
    pub fn open(root: &Path) -> StoreResult<Self> {
        let objects_dir = root.join("objects");
        fs::create_dir_all(&objects_dir)?;
        Ok(Self {
            objects_dir,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            verify_on_read: true,
        })
    }

    /// Set the zstd level used for new objects.
    pub fn with_compression_level(mut self, level: i32) -> Self {
        self.compression_level = level;
        self
    }

    /// Enable or disable re-hashing of objects on read.
    pub fn with_verify_on_read(mut self, verify: bool) -> Self {
        self.verify_on_read = verify;
        self
    }

    /// Path of the file holding `id`.
    pub fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.objects_dir.join(&hex[..2]).join(&hex[2..])
    }

    /// All object ids present on disk, sorted.
    pub fn all_ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids = Vec::new();
        for fanout in fs::read_dir(&self.objects_dir)? {
            let fanout = fanout?;
            if !fanout.file_type()?.is_dir() {
                continue;
            }
            let prefix = fanout.file_name().to_string_lossy().into_owned();
            for file in fs::read_dir(fanout.path())? {
                let file = file?;
                let hex = format!("{prefix}{}", file.file_name().to_string_lossy());
                match ObjectId::from_hex(&hex) {
                    Ok(id) => ids.push(id),
                    // Leftover temp files from interrupted writes.
                    Err(_) => debug!(path = ?file.path(), "skipping non-object file"),
                }
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn encode(&self, object: &StoredObject) -> StoreResult<Vec<u8>> {
        let mut raw = Vec::with_capacity(object.data.len() + 16);
        raw.extend_from_slice(format!("{} {}\0", object.kind, object.data.len()).as_bytes());
        raw.extend_from_slice(&object.data);
        Ok(zstd::encode_all(raw.as_slice(), self.compression_level)?)
    }

    fn decode(id: &ObjectId, bytes: &[u8]) -> StoreResult<StoredObject> {
        let corrupt = |reason: String| StoreError::CorruptObject { id: *id, reason };

        let raw = zstd::decode_all(bytes).map_err(|e| corrupt(format!("decompress: {e}")))?;
        let nul = raw
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| corrupt("missing header terminator".into()))?;
        let header = std::str::from_utf8(&raw[..nul])
            .map_err(|_| corrupt("non-utf8 header".into()))?;
        let (kind, len) = header
            .split_once(' ')
            .ok_or_else(|| corrupt(format!("malformed header {header:?}")))?;
        let kind: ObjectKind = kind.parse().map_err(|_| corrupt(format!("unknown kind {kind:?}")))?;
        let len: usize = len
            .parse()
            .map_err(|_| corrupt(format!("bad length {len:?}")))?;

        let data = raw[nul + 1..].to_vec();
        if data.len() != len {
            return Err(corrupt(format!(
                "length mismatch: header says {len}, found {}",
                data.len()
            )));
        }
        Ok(StoredObject::new(kind, data))
    }
}

impl ObjectStore for LooseObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        let bytes = match fs::read(self.object_path(id)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let object = Self::decode(id, &bytes)?;

        if self.verify_on_read {
            let computed = object.compute_id();
            if computed != *id {
                warn!(%id, %computed, "object content does not match its id");
                return Err(StoreError::HashMismatch {
                    id: *id,
                    expected: id.to_hex(),
                    computed: computed.to_hex(),
                });
            }
        }
        Ok(Some(object))
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        if self.exists(&id)? {
            return Ok(id);
        }
        let path = self.object_path(&id);

        let dir = path
            .parent()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "object path has no parent"))?;
        fs::create_dir_all(dir)?;

        let encoded = self.encode(object)?;
        let mut tmp = NamedTempFile::new_in(dir)?;
        tmp.write_all(&encoded)?;
        tmp.as_file().sync_all()?;
        tmp.persist(&path).map_err(|e| StoreError::Io(e.error))?;

        debug!(%id, kind = %object.kind, size = object.size, "wrote loose object");
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::metadata(self.object_path(id)) {
            Ok(meta) => Ok(meta.is_file()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        match fs::remove_file(self.object_path(id)) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
