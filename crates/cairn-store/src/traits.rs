use cairn_types::ObjectId;

use crate::error::{StoreError, StoreResult};
use crate::object::StoredObject;

/// Backend for content-addressed objects.
///
/// An id is derived from an object's kind and bytes, so a stored object can
/// never change under its id. Backends are shared between handles and must
/// be `Send + Sync`; they treat payloads as opaque and surface every I/O
/// failure to the caller.
pub trait ObjectStore: Send + Sync {
    /// The object stored under `id`, or `Ok(None)` when there is none.
    fn read(&self, id: &ObjectId) -> StoreResult<Option<StoredObject>>;

    /// Store `object` and return its id. Writing an existing object is a
    /// no-op.
    fn write(&self, object: &StoredObject) -> StoreResult<ObjectId>;

    fn exists(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Remove `id`, reporting whether it was present.
    ///
    /// Refs and trees pointing at the object are left dangling.
    fn delete(&self, id: &ObjectId) -> StoreResult<bool>;

    /// Like [`read`](Self::read), but a missing object is `NotFound`.
    fn fetch(&self, id: &ObjectId) -> StoreResult<StoredObject> {
        self.read(id)?.ok_or(StoreError::NotFound(*id))
    }

    /// Read several ids, keeping their order.
    fn read_batch(&self, ids: &[ObjectId]) -> StoreResult<Vec<Option<StoredObject>>> {
        ids.iter().map(|id| self.read(id)).collect()
    }

    /// Write several objects, returning ids in input order.
    fn write_batch(&self, objects: &[StoredObject]) -> StoreResult<Vec<ObjectId>> {
        objects.iter().map(|obj| self.write(obj)).collect()
    }
}
