//! The walker: an ordered descent stack plus copy-on-write mutation
//!
//! A walker holds a path of decoded objects from one owner's root down to
//! the current position. Descent (`advance_*`) extends the path one object
//! at a time; mutation (`append_*`/`replace_*`) persists a new leaf and
//! climbs the path back up, re-hashing every ancestor and finally rewriting
//! the owning root slot.

use crate::access::Traverse;
use crate::lock;
use crate::model::{DynamicRef, OwnerKey, Reference};
use crate::store::Store;
use crate::walk::node::{save_chain, Link, Node};
use crate::{Error, Result};
use std::fmt;
use std::sync::Arc;

/// Walks and mutates one owner's object tree
///
/// The descent stack is always a single linear path. After a successful
/// mutation the instances still on the stack no longer match the freshly
/// persisted content; callers observe the new state by re-descending from
/// the root, never by implicit refresh.
///
/// Store-touching operations serialize per owner key: two walkers over the
/// same owner never interleave a read-root / decide / replace-root
/// sequence, while walkers over distinct owners do not contend.
pub struct Walker {
    store: Arc<dyn Store>,
    owner: OwnerKey,
    stack: Vec<Node>,
}

impl Walker {
    /// Create a walker over `owner`'s root in the given store
    pub fn new(store: Arc<dyn Store>, owner: OwnerKey) -> Self {
        Walker {
            store,
            owner,
            stack: Vec::new(),
        }
    }

    /// Current depth of the descent stack
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// The owner key this walker is bound to
    pub fn owner(&self) -> &OwnerKey {
        &self.owner
    }

    /// Drop the whole descent path
    pub fn clear(&mut self) {
        self.stack.clear();
    }

    /// Step back up one level; no-op at depth 0
    pub fn retreat(&mut self) {
        self.stack.pop();
    }

    fn top(&self) -> Result<&Node> {
        self.stack.last().ok_or(Error::EmptyStack)
    }

    fn top_mut(&mut self) -> Result<&mut Node> {
        self.stack.last_mut().ok_or(Error::EmptyStack)
    }

    /// Descend into a direct child of the root
    ///
    /// Resolves the owner's current root and walks its ordered entries,
    /// offering each candidate of `T`'s schema to the chooser; the first
    /// accepted one becomes the new depth-1 position and is returned.
    ///
    /// The stack is reset unconditionally, success or not: on
    /// [`Error::ObjectNotFound`] (nothing accepted) or any resolution
    /// failure the walker is left at depth 0.
    pub fn advance_from_root<T, F>(&mut self, mut chooser: F) -> Result<T>
    where
        T: Traverse,
        F: FnMut(&T) -> bool,
    {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        self.stack.clear();

        let entries = self.store.resolve_root(&self.owner)?;
        let schema = self.store.schema_by_name(T::SCHEMA)?;

        for (slot, entry) in entries.iter().enumerate() {
            // Entries of other schemas cannot decode into T; the chooser
            // only ever sees real candidates.
            if entry.schema != schema {
                continue;
            }
            let (bytes, _) = self.store.decode(entry)?;
            let candidate: T = bincode::deserialize(&bytes)?;
            if chooser(&candidate) {
                self.stack
                    .push(Node::root_child(schema, Box::new(candidate.clone()), slot));
                return Ok(candidate);
            }
        }
        Err(Error::ObjectNotFound(format!(
            "no accepted {} under root",
            T::SCHEMA
        )))
    }

    /// Descend through a reference-array field of the current position
    ///
    /// Candidates are offered to the chooser in array order; the first
    /// accepted one is pushed with its array index recorded. The stack is
    /// left exactly as it was on any failure.
    pub fn advance_from_refs_field<T, F>(&mut self, field: &str, mut chooser: F) -> Result<T>
    where
        T: Traverse,
        F: FnMut(&T) -> bool,
    {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        let (refs, declared) = top.obj.ref_array(field)?;
        if declared != T::SCHEMA {
            return Err(Error::SchemaMismatch {
                field: field.to_string(),
                declared,
                requested: T::SCHEMA.to_string(),
            });
        }
        let schema = self.store.schema_by_name(&declared)?;

        for (i, object) in refs.into_iter().enumerate() {
            let (bytes, _) = self.store.decode(&DynamicRef::new(object, schema))?;
            let candidate: T = bincode::deserialize(&bytes)?;
            if chooser(&candidate) {
                self.stack
                    .push(Node::child(schema, Box::new(candidate.clone()), field, Some(i)));
                return Ok(candidate);
            }
        }
        Err(Error::ObjectNotFound(format!(
            "no accepted {} in '{}'",
            T::SCHEMA,
            field
        )))
    }

    /// Descend through a single-reference field of the current position
    ///
    /// No chooser: the field holds exactly one candidate.
    pub fn advance_from_ref_field<T: Traverse>(&mut self, field: &str) -> Result<T> {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        let (object, declared) = top.obj.single_ref(field)?;
        if declared != T::SCHEMA {
            return Err(Error::SchemaMismatch {
                field: field.to_string(),
                declared,
                requested: T::SCHEMA.to_string(),
            });
        }
        let schema = self.store.schema_by_name(&declared)?;
        let (bytes, _) = self.store.decode(&DynamicRef::new(object, schema))?;
        let value: T = bincode::deserialize(&bytes)?;
        self.stack
            .push(Node::child(schema, Box::new(value.clone()), field, None));
        Ok(value)
    }

    /// Descend through a dynamic-reference field of the current position
    ///
    /// The field carries its own schema id, which must match `T`'s
    /// registered schema.
    pub fn advance_from_dynamic_field<T: Traverse>(&mut self, field: &str) -> Result<T> {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        let dref = top.obj.dynamic_ref(field)?;
        let schema = self.store.schema_by_name(T::SCHEMA)?;
        if dref.schema != schema {
            let declared = self
                .store
                .schema_by_id(&dref.schema)
                .map(|d| d.name)
                .unwrap_or_else(|_| dref.schema.short());
            return Err(Error::SchemaMismatch {
                field: field.to_string(),
                declared,
                requested: T::SCHEMA.to_string(),
            });
        }
        let (bytes, _) = self.store.decode(&dref)?;
        let value: T = bincode::deserialize(&bytes)?;
        self.stack
            .push(Node::child(dref.schema, Box::new(value.clone()), field, None));
        Ok(value)
    }

    /// Persist `value` and append its reference to an array field of the
    /// current position, then save the whole path back to the root
    ///
    /// Returns the new leaf's reference. The stack does not auto-advance
    /// into the appended element.
    pub fn append_to_refs_field<T: Traverse>(&mut self, field: &str, value: &T) -> Result<Reference> {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        let (mut refs, declared) = top.obj.ref_array(field)?;
        if declared != T::SCHEMA {
            return Err(Error::SchemaMismatch {
                field: field.to_string(),
                declared,
                requested: T::SCHEMA.to_string(),
            });
        }

        let fresh = self.store.save(&bincode::serialize(value)?)?;
        refs.push(fresh);
        self.top_mut()?.obj.set_ref_array(field, refs)?;

        save_chain(&*self.store, &self.owner, &mut self.stack)?;
        Ok(fresh)
    }

    /// Persist `value` and write its reference over a single-reference
    /// field of the current position, then save the whole path back to the
    /// root
    pub fn replace_in_ref_field<T: Traverse>(&mut self, field: &str, value: &T) -> Result<Reference> {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        // Validates presence and shape before anything is persisted.
        let (_, declared) = top.obj.single_ref(field)?;
        if declared != T::SCHEMA {
            return Err(Error::SchemaMismatch {
                field: field.to_string(),
                declared,
                requested: T::SCHEMA.to_string(),
            });
        }

        let fresh = self.store.save(&bincode::serialize(value)?)?;
        self.top_mut()?.obj.set_single_ref(field, fresh)?;

        save_chain(&*self.store, &self.owner, &mut self.stack)?;
        Ok(fresh)
    }

    /// Persist `value` as a dynamic reference of its own schema and write it
    /// over a dynamic field of the current position, then save the whole
    /// path back to the root
    pub fn replace_in_dynamic_field<T: Traverse>(
        &mut self,
        field: &str,
        value: &T,
    ) -> Result<Reference> {
        let guard = lock::owner(&self.owner);
        let _held = guard.lock();

        let top = self.top()?;
        if field.is_empty() {
            return Err(Error::FieldNotProvided);
        }
        top.obj.dynamic_ref(field)?;

        let schema = self.store.schema_by_name(T::SCHEMA)?;
        let dref = self
            .store
            .save_dynamic(&bincode::serialize(value)?, schema)?;
        self.top_mut()?.obj.set_dynamic_ref(field, dref)?;

        save_chain(&*self.store, &self.owner, &mut self.stack)?;
        Ok(dref.object)
    }
}

/// Diagnostic trace of the current descent path
///
/// One line per node: schema name, the decoded value, and the field/index
/// linking to the next node. Debug aid only; the format is not stable.
impl fmt::Display for Walker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Root")?;
        let first = match self.stack.first() {
            Some(node) => node,
            None => return Ok(()),
        };
        if let Link::Root { slot } = &first.link {
            writeln!(f, ".Refs[{}] ->", slot)?;
        }
        for (depth, node) in self.stack.iter().enumerate() {
            let name = self
                .store
                .schema_by_id(&node.schema)
                .map(|d| d.name)
                .unwrap_or_default();
            let pad = "\t".repeat(depth);
            writeln!(f, "{}  {} = {:?}", pad, name, node.obj)?;
            if let Some(next) = self.stack.get(depth + 1) {
                if let Link::Field {
                    name: field,
                    index,
                } = &next.link
                {
                    write!(f, "{}  {}.{}", pad, name, field)?;
                    if let Some(i) = index {
                        write!(f, "[{}]", i)?;
                    }
                    writeln!(f, " ->")?;
                }
            }
        }
        Ok(())
    }
}
