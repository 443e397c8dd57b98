//! Object store interface
//!
//! The walker consumes the store, it never implements it: persistence,
//! hashing of stored bytes, schema registration, root signing and network
//! sync all live behind [`Store`]. [`MemStore`] is the in-memory
//! implementation used by tests and embedded setups.

mod memory;

pub use memory::MemStore;

use crate::model::{DynamicRef, OwnerKey, Reference, SchemaDescriptor, SchemaId};
use crate::Result;
use bytes::Bytes;

/// External object store the walker runs against
pub trait Store: Send + Sync {
    /// Ordered top-level entries of the owner's current root
    fn resolve_root(&self, owner: &OwnerKey) -> Result<Vec<DynamicRef>>;

    /// Atomically replace one slot of the owner's root
    fn replace_root_entry(&self, owner: &OwnerKey, slot: usize, entry: DynamicRef) -> Result<()>;

    /// Atomically replace the owner's whole entry list
    fn replace_root(&self, owner: &OwnerKey, entries: Vec<DynamicRef>) -> Result<()>;

    /// Fetch an object's bytes along with its schema id
    fn decode(&self, dref: &DynamicRef) -> Result<(Bytes, SchemaId)>;

    /// Resolve a registered schema by name
    fn schema_by_name(&self, name: &str) -> Result<SchemaId>;

    /// Resolve a registered schema by id
    fn schema_by_id(&self, id: &SchemaId) -> Result<SchemaDescriptor>;

    /// Persist encoded bytes, returning their content reference
    fn save(&self, bytes: &[u8]) -> Result<Reference>;

    /// Persist encoded bytes as a dynamic reference of the given schema
    fn save_dynamic(&self, bytes: &[u8], schema: SchemaId) -> Result<DynamicRef> {
        Ok(DynamicRef::new(self.save(bytes)?, schema))
    }
}
