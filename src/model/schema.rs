//! Schema descriptors and the three reference shapes
//!
//! Schemas are not known at compile time: the walker discovers a field's
//! shape through an explicit tagged descriptor instead of inspecting types
//! at run time. Single and array fields declare their target schema by name;
//! dynamic fields need none because the stored value carries its own id.

use crate::model::Reference;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a registered schema: the content hash of its descriptor
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct SchemaId(Reference);

impl SchemaId {
    /// Derive the id of a descriptor from its canonical encoding
    pub fn of(desc: &SchemaDescriptor) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(desc.name.as_bytes());
        for field in &desc.fields {
            hasher.update(&[0xff]);
            hasher.update(field.name.as_bytes());
            match &field.kind {
                FieldKind::Single { schema } => {
                    hasher.update(&[1]);
                    hasher.update(schema.as_bytes());
                }
                FieldKind::Array { schema } => {
                    hasher.update(&[2]);
                    hasher.update(schema.as_bytes());
                }
                FieldKind::Dynamic => {
                    hasher.update(&[3]);
                }
            }
        }
        SchemaId(Reference::from_bytes(*hasher.finalize().as_bytes()))
    }

    /// The underlying content reference
    pub fn as_reference(&self) -> Reference {
        self.0
    }

    /// Convert to hex string
    pub fn to_hex(&self) -> String {
        self.0.to_hex()
    }

    /// Get a short prefix for display
    pub fn short(&self) -> String {
        self.0.short()
    }
}

impl fmt::Display for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for SchemaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SchemaId({})", self.short())
    }
}

/// Declared shape of a reference-carrying field
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// One reference to a fixed schema
    Single { schema: String },
    /// Ordered references, all of one fixed schema
    Array { schema: String },
    /// A reference paired with its own schema id
    Dynamic,
}

/// One declared field of a schema: name plus tagged shape
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub fn single(name: &str, schema: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            kind: FieldKind::Single {
                schema: schema.to_string(),
            },
        }
    }

    pub fn array(name: &str, schema: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            kind: FieldKind::Array {
                schema: schema.to_string(),
            },
        }
    }

    pub fn dynamic(name: &str) -> Self {
        FieldSpec {
            name: name.to_string(),
            kind: FieldKind::Dynamic,
        }
    }
}

/// Named descriptor of a stored type's reference-shaped fields
///
/// Scalar payload fields are opaque to the walker and are not described.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDescriptor {
    pub name: String,
    pub fields: Vec<FieldSpec>,
}

impl SchemaDescriptor {
    /// Look up a declared field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The descriptor's content-derived id
    pub fn id(&self) -> SchemaId {
        SchemaId::of(self)
    }
}

/// A reference paired with an explicit schema id, for polymorphic links
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Serialize, Deserialize)]
pub struct DynamicRef {
    pub object: Reference,
    pub schema: SchemaId,
}

impl DynamicRef {
    pub fn new(object: Reference, schema: SchemaId) -> Self {
        DynamicRef { object, schema }
    }
}

/// A field value in one of the three reference shapes
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefValue {
    Single(Reference),
    Array(Vec<Reference>),
    Dynamic(DynamicRef),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            name: "Board".to_string(),
            fields: vec![
                FieldSpec::single("Creator", "Person"),
                FieldSpec::dynamic("Featured"),
                FieldSpec::array("Threads", "Thread"),
            ],
        }
    }

    #[test]
    fn test_schema_id_deterministic() {
        assert_eq!(board_descriptor().id(), board_descriptor().id());
    }

    #[test]
    fn test_schema_id_sensitive_to_shape() {
        let mut other = board_descriptor();
        other.fields[0] = FieldSpec::array("Creator", "Person");
        assert_ne!(board_descriptor().id(), other.id());

        let mut renamed = board_descriptor();
        renamed.name = "Forum".to_string();
        assert_ne!(board_descriptor().id(), renamed.id());
    }

    #[test]
    fn test_field_lookup() {
        let desc = board_descriptor();
        assert_eq!(
            desc.field("Threads").map(|f| &f.kind),
            Some(&FieldKind::Array {
                schema: "Thread".to_string()
            })
        );
        assert!(desc.field("Missing").is_none());
    }
}
