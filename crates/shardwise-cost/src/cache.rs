//! Per-collection cost cache.
//!
//! Entries are addressed by `CollectionId` and are created lazily on the first
//! computation for a collection. Invalidation marks an entry stale and bumps
//! its generation; only `clear` removes entries. Invalidating a collection
//! with no entry is a no-op.

use std::collections::{btree_map, BTreeMap};

use shardwise_core::id::CollectionId;

use crate::metrics::CacheStats;

#[derive(Debug, Clone)]
struct Slot<T> {
    value: T,
    valid: bool,
    generation: u64,
}

#[derive(Debug, Clone)]
pub struct CostCache<T> {
    entries: BTreeMap<CollectionId, Slot<T>>,
    stats: CacheStats,
}

impl<T> Default for CostCache<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            stats: CacheStats::default(),
        }
    }
}

impl<T> CostCache<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the valid entry for `id`, computing and storing it on a miss.
    pub fn get_or_try_insert_with<E, F>(&mut self, id: CollectionId, compute: F) -> Result<&T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        let slot = match self.entries.entry(id) {
            btree_map::Entry::Occupied(occupied) => {
                let slot = occupied.into_mut();
                if slot.valid {
                    self.stats.hits += 1;
                } else {
                    self.stats.misses += 1;
                    slot.value = compute()?;
                    slot.valid = true;
                }
                slot
            }
            btree_map::Entry::Vacant(vacant) => {
                self.stats.misses += 1;
                vacant.insert(Slot {
                    value: compute()?,
                    valid: true,
                    generation: 0,
                })
            }
        };
        Ok(&slot.value)
    }

    /// Valid entry for `id` without counting a hit or miss.
    pub fn peek(&self, id: CollectionId) -> Option<&T> {
        self.entries.get(&id).filter(|e| e.valid).map(|e| &e.value)
    }

    /// Mark `id` stale. Returns whether an entry existed.
    pub fn invalidate(&mut self, id: CollectionId) -> bool {
        match self.entries.get_mut(&id) {
            Some(e) => {
                e.valid = false;
                e.generation += 1;
                true
            }
            None => false,
        }
    }

    pub fn invalidate_all(&mut self) {
        for e in self.entries.values_mut() {
            e.valid = false;
            e.generation += 1;
        }
    }

    /// Number of times `id` has been invalidated since it was created.
    pub fn generation(&self, id: CollectionId) -> Option<u64> {
        self.entries.get(&id).map(|e| e.generation)
    }

    pub fn is_valid(&self, id: CollectionId) -> bool {
        self.peek(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry and zero the local counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats = CacheStats::default();
    }

    /// Counters since the last call; resets them.
    pub fn take_stats(&mut self) -> CacheStats {
        std::mem::take(&mut self.stats)
    }
}
