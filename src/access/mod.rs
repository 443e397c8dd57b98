//! Field access contracts
//!
//! The walker operates over arbitrary registered schemas with no
//! compile-time knowledge of them. [`Traverse`] is the single seam where a
//! stored type declares its reference-shaped fields and exposes them by
//! name; [`FieldAccess`] is the object-safe form of that contract which the
//! walker keeps on its stack. All shape discovery and validation happens
//! here, keeping every other component shape-agnostic.

use crate::model::{DynamicRef, FieldKind, FieldSpec, RefValue, Reference, SchemaDescriptor};
use crate::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;

/// Per-type contract for objects the walker can visit
///
/// Implementations declare their registered schema name and their
/// reference-shaped fields, and translate between field names and concrete
/// struct fields. Scalar payload fields are opaque to the walker and are not
/// declared.
pub trait Traverse: Serialize + DeserializeOwned + Clone + fmt::Debug + Send + 'static {
    /// Registered schema name
    const SCHEMA: &'static str;

    /// Declared reference-shaped fields, in declaration order
    fn fields() -> Vec<FieldSpec>;

    /// Read a declared field; `None` when the name is not declared
    fn get(&self, field: &str) -> Option<RefValue>;

    /// Overwrite a declared field in place
    ///
    /// Returns `false` when the name is not declared or the value's shape
    /// does not match the declaration; the instance is untouched in that
    /// case.
    fn set(&mut self, field: &str, value: RefValue) -> bool;

    /// Full descriptor for registration with a store
    fn descriptor() -> SchemaDescriptor {
        SchemaDescriptor {
            name: Self::SCHEMA.to_string(),
            fields: Self::fields(),
        }
    }
}

/// Object-safe view of a decoded instance held on the walker stack
///
/// Every getter and setter validates the requested shape against the
/// declared [`FieldKind`] before touching the value: an absent name fails
/// with [`Error::FieldNotFound`], a shape mismatch with
/// [`Error::FieldWrongType`], and neither performs a partial read or write.
pub trait FieldAccess: fmt::Debug + Send {
    /// Encode the instance for persisting
    fn encode(&self) -> Result<Vec<u8>>;

    /// Declared shape of a field, for dispatch during the save chain
    fn field_kind(&self, field: &str) -> Result<FieldKind>;

    /// Read a single-reference field; returns the value and the declared
    /// target schema name
    fn single_ref(&self, field: &str) -> Result<(Reference, String)>;

    /// Read a reference-array field; returns the values and the declared
    /// target schema name
    fn ref_array(&self, field: &str) -> Result<(Vec<Reference>, String)>;

    /// Read a dynamic-reference field
    fn dynamic_ref(&self, field: &str) -> Result<DynamicRef>;

    fn set_single_ref(&mut self, field: &str, value: Reference) -> Result<()>;

    fn set_ref_array(&mut self, field: &str, value: Vec<Reference>) -> Result<()>;

    fn set_dynamic_ref(&mut self, field: &str, value: DynamicRef) -> Result<()>;
}

fn spec_of<T: Traverse>(field: &str) -> Result<FieldSpec> {
    T::fields()
        .into_iter()
        .find(|f| f.name == field)
        .ok_or_else(|| Error::FieldNotFound(field.to_string()))
}

fn wrong_type(field: &str, want: &'static str) -> Error {
    Error::FieldWrongType {
        field: field.to_string(),
        want,
    }
}

impl<T: Traverse> FieldAccess for T {
    fn encode(&self) -> Result<Vec<u8>> {
        Ok(bincode::serialize(self)?)
    }

    fn field_kind(&self, field: &str) -> Result<FieldKind> {
        Ok(spec_of::<T>(field)?.kind)
    }

    fn single_ref(&self, field: &str) -> Result<(Reference, String)> {
        let spec = spec_of::<T>(field)?;
        let schema = match spec.kind {
            FieldKind::Single { schema } => schema,
            _ => return Err(wrong_type(field, "single reference")),
        };
        match self.get(field) {
            Some(RefValue::Single(r)) => Ok((r, schema)),
            _ => Err(wrong_type(field, "single reference")),
        }
    }

    fn ref_array(&self, field: &str) -> Result<(Vec<Reference>, String)> {
        let spec = spec_of::<T>(field)?;
        let schema = match spec.kind {
            FieldKind::Array { schema } => schema,
            _ => return Err(wrong_type(field, "reference array")),
        };
        match self.get(field) {
            Some(RefValue::Array(rs)) => Ok((rs, schema)),
            _ => Err(wrong_type(field, "reference array")),
        }
    }

    fn dynamic_ref(&self, field: &str) -> Result<DynamicRef> {
        let spec = spec_of::<T>(field)?;
        if spec.kind != FieldKind::Dynamic {
            return Err(wrong_type(field, "dynamic reference"));
        }
        match self.get(field) {
            Some(RefValue::Dynamic(d)) => Ok(d),
            _ => Err(wrong_type(field, "dynamic reference")),
        }
    }

    fn set_single_ref(&mut self, field: &str, value: Reference) -> Result<()> {
        let spec = spec_of::<T>(field)?;
        if !matches!(spec.kind, FieldKind::Single { .. }) {
            return Err(wrong_type(field, "single reference"));
        }
        if self.set(field, RefValue::Single(value)) {
            Ok(())
        } else {
            Err(wrong_type(field, "single reference"))
        }
    }

    fn set_ref_array(&mut self, field: &str, value: Vec<Reference>) -> Result<()> {
        let spec = spec_of::<T>(field)?;
        if !matches!(spec.kind, FieldKind::Array { .. }) {
            return Err(wrong_type(field, "reference array"));
        }
        if self.set(field, RefValue::Array(value)) {
            Ok(())
        } else {
            Err(wrong_type(field, "reference array"))
        }
    }

    fn set_dynamic_ref(&mut self, field: &str, value: DynamicRef) -> Result<()> {
        let spec = spec_of::<T>(field)?;
        if spec.kind != FieldKind::Dynamic {
            return Err(wrong_type(field, "dynamic reference"));
        }
        if self.set(field, RefValue::Dynamic(value)) {
            Ok(())
        } else {
            Err(wrong_type(field, "dynamic reference"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Note {
        title: String,
        author: Reference,
        tags: Vec<Reference>,
        pinned: DynamicRef,
    }

    impl Traverse for Note {
        const SCHEMA: &'static str = "Note";

        fn fields() -> Vec<FieldSpec> {
            vec![
                FieldSpec::single("Author", "Person"),
                FieldSpec::array("Tags", "Tag"),
                FieldSpec::dynamic("Pinned"),
            ]
        }

        fn get(&self, field: &str) -> Option<RefValue> {
            match field {
                "Author" => Some(RefValue::Single(self.author)),
                "Tags" => Some(RefValue::Array(self.tags.clone())),
                "Pinned" => Some(RefValue::Dynamic(self.pinned)),
                _ => None,
            }
        }

        fn set(&mut self, field: &str, value: RefValue) -> bool {
            match (field, value) {
                ("Author", RefValue::Single(r)) => {
                    self.author = r;
                    true
                }
                ("Tags", RefValue::Array(rs)) => {
                    self.tags = rs;
                    true
                }
                ("Pinned", RefValue::Dynamic(d)) => {
                    self.pinned = d;
                    true
                }
                _ => false,
            }
        }
    }

    #[test]
    fn test_read_by_declared_shape() {
        let note = Note {
            title: "hello".to_string(),
            author: Reference::digest(b"author"),
            tags: vec![Reference::digest(b"tag")],
            pinned: DynamicRef::default(),
        };

        let (r, schema) = note.single_ref("Author").unwrap();
        assert_eq!(r, note.author);
        assert_eq!(schema, "Person");

        let (rs, schema) = note.ref_array("Tags").unwrap();
        assert_eq!(rs, note.tags);
        assert_eq!(schema, "Tag");

        assert_eq!(note.dynamic_ref("Pinned").unwrap(), note.pinned);
    }

    #[test]
    fn test_missing_field() {
        let note = Note::default();
        assert!(matches!(
            note.single_ref("Nope"),
            Err(Error::FieldNotFound(_))
        ));
        assert!(matches!(
            Note::default().set_single_ref("Nope", Reference::ZERO),
            Err(Error::FieldNotFound(_))
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let note = Note::default();
        // Array read of a single field, and the reverse.
        assert!(matches!(
            note.ref_array("Author"),
            Err(Error::FieldWrongType { .. })
        ));
        assert!(matches!(
            note.single_ref("Tags"),
            Err(Error::FieldWrongType { .. })
        ));
        assert!(matches!(
            note.dynamic_ref("Author"),
            Err(Error::FieldWrongType { .. })
        ));

        let mut note = Note::default();
        assert!(matches!(
            note.set_ref_array("Pinned", vec![]),
            Err(Error::FieldWrongType { .. })
        ));
        // Failed writes leave the instance untouched.
        assert_eq!(note, Note::default());
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut note = Note::default();
        let r = Reference::digest(b"new author");
        note.set_single_ref("Author", r).unwrap();
        assert_eq!(note.author, r);

        let rs = vec![Reference::digest(b"a"), Reference::digest(b"b")];
        note.set_ref_array("Tags", rs.clone()).unwrap();
        assert_eq!(note.tags, rs);
    }

    #[test]
    fn test_encode_roundtrip() {
        let note = Note {
            title: "hello".to_string(),
            author: Reference::digest(b"author"),
            tags: vec![],
            pinned: DynamicRef::default(),
        };
        let bytes = FieldAccess::encode(&note).unwrap();
        let back: Note = bincode::deserialize(&bytes).unwrap();
        assert_eq!(back, note);
    }
}
