//! Core data model types for rootwalk

mod reference;
mod schema;

pub use reference::{OwnerKey, Reference};
pub use schema::{DynamicRef, FieldKind, FieldSpec, RefValue, SchemaDescriptor, SchemaId};
