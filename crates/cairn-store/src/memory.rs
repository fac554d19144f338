//! Object store that keeps everything in process memory.

use std::collections::HashMap;
use std::fmt;
use std::sync::{RwLock, RwLockReadGuard};

use cairn_types::ObjectId;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;
use crate::traits::ObjectStore;

/// `HashMap`-backed [`ObjectStore`] for tests and embedding.
///
/// Objects are cloned in and out; the map sits behind a `RwLock` so readers
/// never block each other.
#[derive(Default)]
pub struct InMemoryObjectStore {
    objects: RwLock<HashMap<ObjectId, StoredObject>>,
}

impl InMemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn snapshot(&self) -> StoreResult<RwLockReadGuard<'_, HashMap<ObjectId, StoredObject>>> {
        self.objects.read().map_err(poisoned)
    }

    /// Number of stored objects.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.snapshot()?.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.snapshot()?.is_empty())
    }

    /// Sum of payload sizes across all objects.
    pub fn total_bytes(&self) -> StoreResult<u64> {
        Ok(self.snapshot()?.values().map(|obj| obj.size).sum())
    }

    /// Every stored id, sorted.
    pub fn all_ids(&self) -> StoreResult<Vec<ObjectId>> {
        let mut ids: Vec<ObjectId> = self.snapshot()?.keys().copied().collect();
        ids.sort_unstable();
        Ok(ids)
    }
}

fn poisoned<E: fmt::Display>(e: E) -> StoreError {
    StoreError::Storage(format!("lock poisoned: {e}"))
}

impl ObjectStore for InMemoryObjectStore {
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>> {
        Ok(self.snapshot()?.get(id).cloned())
    }

    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId> {
        let id = object.compute_id();
        if id.is_null() {
            return Err(StoreError::NullObjectId);
        }
        let mut objects = self.objects.write().map_err(poisoned)?;
        // An id always names the same bytes, so the first copy stays.
        objects.entry(id).or_insert_with(|| {
            debug!(%id, kind = %object.kind, size = object.size, "stored object");
            object.clone()
        });
        Ok(id)
    }

    fn exists(&self, id: &ObjectId) -> StoreResult<bool> {
        Ok(self.snapshot()?.contains_key(id))
    }

    fn delete(&self, id: &ObjectId) -> StoreResult<bool> {
        let removed = self.objects.write().map_err(poisoned)?.remove(id).is_some();
        Ok(removed)
    }
}

impl fmt::Debug for InMemoryObjectStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("InMemoryObjectStore");
        match self.len() {
            Ok(count) => s.field("object_count", &count),
            Err(_) => s.field("poisoned", &true),
        };
        s.finish()
    }
}
