//! Stack nodes and the copy-on-write save chain

use crate::access::FieldAccess;
use crate::model::{DynamicRef, FieldKind, OwnerKey, SchemaId};
use crate::store::Store;
use crate::{Error, Result};

/// How a node was reached from the level above it
#[derive(Clone, Debug)]
pub(crate) enum Link {
    /// Direct child of the root, at this slot of its ordered entries
    Root { slot: usize },
    /// Reached through a named field on the level above; `index` is the
    /// position within a reference array, `None` for single and dynamic
    /// links
    Field { name: String, index: Option<usize> },
}

/// One stop on the descent path: a decoded instance plus its graph position
///
/// The instance is a private copy of the stored bytes, not a live view.
pub(crate) struct Node {
    pub schema: SchemaId,
    pub obj: Box<dyn FieldAccess>,
    pub link: Link,
}

impl Node {
    pub fn root_child(schema: SchemaId, obj: Box<dyn FieldAccess>, slot: usize) -> Self {
        Node {
            schema,
            obj,
            link: Link::Root { slot },
        }
    }

    pub fn child(
        schema: SchemaId,
        obj: Box<dyn FieldAccess>,
        field: &str,
        index: Option<usize>,
    ) -> Self {
        Node {
            schema,
            obj,
            link: Link::Field {
                name: field.to_string(),
                index,
            },
        }
    }
}

/// Re-persist every node from the top of `stack` back to the root
///
/// Each step saves the node's current bytes, obtaining a fresh reference,
/// then rewrites the link the level above used to reach it: an array link
/// overwrites one element, a single link the whole field, a dynamic link the
/// field with the node's schema id preserved. The climb terminates by
/// atomically replacing the owner's root slot.
///
/// A field error aborts the climb and surfaces unchanged. Ancestors saved
/// before the failure stay in the store unlinked from the root; their
/// reclamation is the store's concern, not ours.
pub(crate) fn save_chain(store: &dyn Store, owner: &OwnerKey, stack: &mut [Node]) -> Result<()> {
    for at in (0..stack.len()).rev() {
        let bytes = stack[at].obj.encode()?;
        let fresh = store.save(&bytes)?;
        let schema = stack[at].schema;

        match stack[at].link.clone() {
            Link::Root { slot } => {
                store.replace_root_entry(owner, slot, DynamicRef::new(fresh, schema))?;
                return Ok(());
            }
            Link::Field { name, index } => {
                let parent = &mut stack[at - 1];
                match parent.obj.field_kind(&name)? {
                    FieldKind::Array { .. } => {
                        let (mut refs, _) = parent.obj.ref_array(&name)?;
                        let i = index.unwrap_or(usize::MAX);
                        if i >= refs.len() {
                            return Err(Error::SlotOutOfRange(i));
                        }
                        refs[i] = fresh;
                        parent.obj.set_ref_array(&name, refs)?;
                    }
                    FieldKind::Single { .. } => {
                        parent.obj.set_single_ref(&name, fresh)?;
                    }
                    FieldKind::Dynamic => {
                        parent
                            .obj
                            .set_dynamic_ref(&name, DynamicRef::new(fresh, schema))?;
                    }
                }
            }
        }
    }
    Ok(())
}
