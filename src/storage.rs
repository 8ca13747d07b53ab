//! Per-scope storage
//!
//! [`ImplTable`] is the flattened binding snapshot a scope resolves against.
//! [`InstanceCache`] holds the instances the scope has constructed, behind a
//! reader/writer lock so lookups of already-built services never serialize.

use crate::factory::{FactoryRecord, Instance};
use crate::{Bindings, DisposalOrder, ServiceKey, TypeKey};
use ahash::RandomState;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::mem;

/// Interface -> factory record, fixed once the scope is built.
#[derive(Default)]
pub(crate) struct ImplTable {
    impls: HashMap<TypeKey, FactoryRecord, RandomState>,
}

impl ImplTable {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Copy every binding of `bindings` in, later records overwriting earlier ones.
    pub(crate) fn register(&mut self, bindings: &Bindings) {
        for record in bindings.records() {
            self.impls.insert(record.interface(), record.clone());
        }
    }

    #[inline]
    pub(crate) fn get(&self, interface: &TypeKey) -> Option<&FactoryRecord> {
        self.impls.get(interface)
    }

    #[inline]
    pub(crate) fn contains(&self, interface: &TypeKey) -> bool {
        self.impls.contains_key(interface)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.impls.len()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = &FactoryRecord> {
        self.impls.values()
    }
}

#[derive(Default)]
struct Slots {
    /// Slot -> position in `entries`
    index: HashMap<ServiceKey, usize, RandomState>,
    /// Instances in insertion order
    entries: Vec<(ServiceKey, Instance)>,
    /// Set by `drain`; no insert succeeds afterwards
    closed: bool,
}

/// Instances constructed by one scope, keyed by `(tag, interface)`.
///
/// A slot is written at most once; later writers get the first value back.
#[derive(Default)]
pub(crate) struct InstanceCache {
    slots: RwLock<Slots>,
}

impl InstanceCache {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Shared-lock lookup.
    #[inline]
    pub(crate) fn get(&self, key: &ServiceKey) -> Option<Instance> {
        let slots = self.slots.read();
        slots
            .index
            .get(key)
            .map(|&position| Instance::clone(&slots.entries[position].1))
    }

    /// Exclusive-lock insert that keeps an existing entry.
    ///
    /// Returns the cached instance and whether `instance` was the one stored,
    /// or `None` once the cache has been drained.
    pub(crate) fn insert_or_get(
        &self,
        key: ServiceKey,
        instance: Instance,
    ) -> Option<(Instance, bool)> {
        let mut slots = self.slots.write();
        if slots.closed {
            return None;
        }
        if let Some(&position) = slots.index.get(&key) {
            return Some((Instance::clone(&slots.entries[position].1), false));
        }

        let position = slots.entries.len();
        slots.index.insert(key, position);
        slots.entries.push((key, Instance::clone(&instance)));
        Some((instance, true))
    }

    #[inline]
    pub(crate) fn contains(&self, key: &ServiceKey) -> bool {
        self.slots.read().index.contains_key(key)
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.read().entries.len()
    }

    /// Empty and close the cache, returning its entries in the requested
    /// release order.
    ///
    /// The lock is released before the caller drops the instances, so
    /// destructors that touch the container cannot deadlock on it.
    pub(crate) fn drain(&self, order: DisposalOrder) -> Vec<(ServiceKey, Instance)> {
        let mut entries = {
            let mut slots = self.slots.write();
            slots.closed = true;
            slots.index.clear();
            mem::take(&mut slots.entries)
        };

        if order == DisposalOrder::Reverse {
            entries.reverse();
        }
        entries
    }
}
