//! Error types for rootwalk

use crate::model::OwnerKey;
use thiserror::Error;

/// Result type alias for rootwalk operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in rootwalk operations
///
/// All of these are ordinary result values: nothing is retried internally
/// and lower-level errors surface unchanged.
#[derive(Error, Debug)]
pub enum Error {
    #[error("serialization error: {0}")]
    Serialization(#[from] bincode::Error),

    #[error("no root published for owner {0}")]
    RootNotFound(OwnerKey),

    #[error("object not found: {0}")]
    ObjectNotFound(String),

    #[error("schema not found: {0}")]
    SchemaNotFound(String),

    #[error("field '{field}' targets schema '{declared}', not '{requested}'")]
    SchemaMismatch {
        field: String,
        declared: String,
        requested: String,
    },

    #[error("field not found: {0}")]
    FieldNotFound(String),

    #[error("field name not provided")]
    FieldNotProvided,

    #[error("field '{field}' is not a {want}")]
    FieldWrongType { field: String, want: &'static str },

    #[error("walker stack is empty")]
    EmptyStack,

    #[error("root slot {0} out of range")]
    SlotOutOfRange(usize),
}
