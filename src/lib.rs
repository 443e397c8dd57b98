//! # rootwalk
//!
//! A copy-on-write walker over content-addressed object graphs.
//!
//! Objects live in an external immutable store, addressed by the BLAKE3
//! hash of their encoded bytes. A per-owner root is a signed ordered list
//! of top-level dynamic references and the sole way into the graph. The
//! walker keeps a stack of decoded objects from the root down to the
//! current position, resolves fields by name through per-schema
//! [`Traverse`] contracts, and on mutation re-hashes every ancestor on the
//! path before atomically rewriting the owning root slot.
//!
//! ## Core Concepts
//!
//! - **References**: BLAKE3 content hashes of stored bytes
//! - **Dynamic references**: a reference plus an explicit schema id, for
//!   polymorphic fields
//! - **Roots**: owner-keyed ordered entry lists, the graph entry points
//! - **The stack**: the walker's single linear path of decoded objects
//!
//! ## Example
//!
//! ```ignore
//! use rootwalk::{MemStore, OwnerKey, Walker};
//! use std::sync::Arc;
//!
//! let store = Arc::new(MemStore::new());
//! let owner = OwnerKey::from_seed(b"alice");
//! let mut walker = Walker::new(store, owner);
//!
//! let board: Board = walker.advance_from_root(|b: &Board| b.name == "Talk")?;
//! walker.replace_in_ref_field("Creator", &new_creator)?;
//! ```

pub mod access;
pub mod model;
pub mod store;
pub mod walk;

mod error;
mod lock;

pub use access::{FieldAccess, Traverse};
pub use error::{Error, Result};
pub use model::{
    DynamicRef, FieldKind, FieldSpec, OwnerKey, RefValue, Reference, SchemaDescriptor, SchemaId,
};
pub use store::{MemStore, Store};
pub use walk::Walker;
