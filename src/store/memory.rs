//! In-memory content-addressed store

use crate::access::Traverse;
use crate::model::{DynamicRef, OwnerKey, Reference, SchemaDescriptor, SchemaId};
use crate::store::Store;
use crate::{Error, Result};
use bytes::Bytes;
use parking_lot::RwLock;
use std::collections::HashMap;

/// A published root: ordered entries plus a sequence number bumped on every
/// replace, standing in for the signed root versioning of a real store
#[derive(Clone, Debug, Default)]
struct RootRecord {
    entries: Vec<DynamicRef>,
    seq: u64,
}

/// Content-addressed in-memory store
///
/// Holds everything the walker consumes: the object map, the schema
/// registry and per-owner roots. No persistence and no real signing; a
/// production deployment supplies its own [`Store`].
pub struct MemStore {
    objects: RwLock<HashMap<Reference, Bytes>>,
    by_name: RwLock<HashMap<String, SchemaId>>,
    by_id: RwLock<HashMap<SchemaId, SchemaDescriptor>>,
    roots: RwLock<HashMap<OwnerKey, RootRecord>>,
}

impl MemStore {
    pub fn new() -> Self {
        MemStore {
            objects: RwLock::new(HashMap::new()),
            by_name: RwLock::new(HashMap::new()),
            by_id: RwLock::new(HashMap::new()),
            roots: RwLock::new(HashMap::new()),
        }
    }

    /// Register a schema descriptor, returning its id
    ///
    /// Re-registering the same descriptor is a no-op; registering a changed
    /// descriptor under the same name rebinds the name to the new id.
    pub fn register_schema(&self, desc: SchemaDescriptor) -> SchemaId {
        let id = desc.id();
        self.by_name.write().insert(desc.name.clone(), id);
        self.by_id.write().insert(id, desc);
        id
    }

    /// Register a traversable type's schema
    pub fn register<T: Traverse>(&self) -> SchemaId {
        self.register_schema(T::descriptor())
    }

    /// Encode and persist a typed object
    pub fn save_obj<T: Traverse>(&self, value: &T) -> Result<Reference> {
        self.save(&bincode::serialize(value)?)
    }

    /// Encode and persist a typed object as a dynamic reference of its
    /// registered schema
    pub fn dynamic<T: Traverse>(&self, value: &T) -> Result<DynamicRef> {
        let schema = self.schema_by_name(T::SCHEMA)?;
        self.save_dynamic(&bincode::serialize(value)?, schema)
    }

    /// Publish a root for `owner`, replacing any existing one
    pub fn publish_root(&self, owner: &OwnerKey, entries: Vec<DynamicRef>) {
        let mut roots = self.roots.write();
        let rec = roots.entry(*owner).or_default();
        rec.entries = entries;
        rec.seq += 1;
    }

    /// Sequence number of the owner's root; bumps on every replace
    pub fn root_seq(&self, owner: &OwnerKey) -> Option<u64> {
        self.roots.read().get(owner).map(|r| r.seq)
    }

    /// Number of stored objects
    pub fn object_count(&self) -> usize {
        self.objects.read().len()
    }

    /// Check whether a reference resolves
    pub fn contains(&self, r: &Reference) -> bool {
        self.objects.read().contains_key(r)
    }
}

impl Default for MemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemStore {
    fn resolve_root(&self, owner: &OwnerKey) -> Result<Vec<DynamicRef>> {
        self.roots
            .read()
            .get(owner)
            .map(|r| r.entries.clone())
            .ok_or(Error::RootNotFound(*owner))
    }

    fn replace_root_entry(&self, owner: &OwnerKey, slot: usize, entry: DynamicRef) -> Result<()> {
        let mut roots = self.roots.write();
        let rec = roots.get_mut(owner).ok_or(Error::RootNotFound(*owner))?;
        if slot >= rec.entries.len() {
            return Err(Error::SlotOutOfRange(slot));
        }
        rec.entries[slot] = entry;
        rec.seq += 1;
        Ok(())
    }

    fn replace_root(&self, owner: &OwnerKey, entries: Vec<DynamicRef>) -> Result<()> {
        let mut roots = self.roots.write();
        let rec = roots.get_mut(owner).ok_or(Error::RootNotFound(*owner))?;
        rec.entries = entries;
        rec.seq += 1;
        Ok(())
    }

    fn decode(&self, dref: &DynamicRef) -> Result<(Bytes, SchemaId)> {
        let bytes = self
            .objects
            .read()
            .get(&dref.object)
            .cloned()
            .ok_or_else(|| Error::ObjectNotFound(dref.object.short()))?;
        Ok((bytes, dref.schema))
    }

    fn schema_by_name(&self, name: &str) -> Result<SchemaId> {
        self.by_name
            .read()
            .get(name)
            .copied()
            .ok_or_else(|| Error::SchemaNotFound(name.to_string()))
    }

    fn schema_by_id(&self, id: &SchemaId) -> Result<SchemaDescriptor> {
        self.by_id
            .read()
            .get(id)
            .cloned()
            .ok_or_else(|| Error::SchemaNotFound(id.short()))
    }

    fn save(&self, bytes: &[u8]) -> Result<Reference> {
        let r = Reference::digest(bytes);
        self.objects
            .write()
            .entry(r)
            .or_insert_with(|| Bytes::copy_from_slice(bytes));
        Ok(r)
    }
}
