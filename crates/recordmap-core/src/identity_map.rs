//! Per-session cache of live model instances keyed by kind and identity

use crate::identity::{Identity, KindId};
use crate::instance::ModelRef;
use std::collections::HashMap;

/// Outcome of [`IdentityMap::lookup_or_insert`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    /// An instance was already registered under the key
    Found,
    /// The builder ran and its instance was registered
    Created,
}

/// Maps `(kind, identity)` to the one live instance for that record
#[derive(Debug, Default)]
pub struct IdentityMap {
    entries: HashMap<(KindId, Identity), ModelRef>,
}

impl IdentityMap {
    /// Create an empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the instance under `(kind, identity)`, building it on a miss
    pub fn lookup_or_insert<F>(&mut self, kind: &KindId, identity: &Identity, builder: F) -> (ModelRef, Lookup)
    where
        F: FnOnce() -> ModelRef,
    {
        let key = (kind.clone(), identity.clone());
        if let Some(existing) = self.entries.get(&key) {
            tracing::trace!(target: "recordmap::identity_map", %kind, %identity, "hit");
            return (existing.clone(), Lookup::Found);
        }

        tracing::trace!(target: "recordmap::identity_map", %kind, %identity, "miss");
        let instance = builder();
        self.entries.insert(key, instance.clone());
        (instance, Lookup::Created)
    }

    /// Get the instance under `(kind, identity)`
    pub fn get(&self, kind: &KindId, identity: &Identity) -> Option<&ModelRef> {
        self.entries.get(&(kind.clone(), identity.clone()))
    }

    /// Check whether `(kind, identity)` is registered
    pub fn contains(&self, kind: &KindId, identity: &Identity) -> bool {
        self.get(kind, identity).is_some()
    }

    /// Drop one entry; outstanding handles stay valid
    pub fn remove(&mut self, kind: &KindId, identity: &Identity) -> Option<ModelRef> {
        self.entries.remove(&(kind.clone(), identity.clone()))
    }

    /// Drop every entry; outstanding handles stay valid
    pub fn clear(&mut self) {
        tracing::debug!(
            target: "recordmap::identity_map",
            entries = self.entries.len(),
            "clearing identity map"
        );
        self.entries.clear();
    }

    /// Number of registered instances
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map holds no instances
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
