//! Per-owner serialization of root sequences
//!
//! Every store-touching walker operation reads the owner's root, decides,
//! and possibly replaces a slot. Two such sequences must not interleave for
//! one owner, so each owner key gets a lazily-created lock shared by every
//! walker in the process. Walkers over distinct owners do not contend.

use crate::model::OwnerKey;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

static OWNER_LOCKS: OnceLock<Mutex<HashMap<OwnerKey, Arc<Mutex<()>>>>> = OnceLock::new();

/// Lock guarding all root sequences for `owner`
pub(crate) fn owner(owner: &OwnerKey) -> Arc<Mutex<()>> {
    let table = OWNER_LOCKS.get_or_init(|| Mutex::new(HashMap::new()));
    let mut table = table.lock();
    // An entry whose only Arc is the table's has no guard outstanding
    // anywhere, so it can be dropped and lazily recreated on next use.
    // Keeps the table bounded by live walkers instead of every owner seen.
    table.retain(|_, lock| Arc::strong_count(lock) > 1);
    table
        .entry(*owner)
        .or_insert_with(|| Arc::new(Mutex::new(())))
        .clone()
}

#[cfg(test)]
pub(crate) fn table_contains(owner: &OwnerKey) -> bool {
    OWNER_LOCKS
        .get_or_init(|| Mutex::new(HashMap::new()))
        .lock()
        .contains_key(owner)
}
