//! Whole-collection read-through cache for items.
//!
//! # Responsibility
//! - Hold the last full item sequence fetched from the store, or nothing.
//! - Guard that state with one reader/writer lock.
//!
//! # Invariants
//! - Content is either absent or a complete snapshot the owning service
//!   fetched from the store; it is never patched in place.
//! - Every invalidation bumps the write generation, so a snapshot fetched
//!   before a completed write can never be installed after it.
//! - Locks are held only around the in-memory check/assign/clear, never
//!   across store I/O.

use crate::model::item::Item;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

/// Shared, immutable view of the whole item collection.
pub type ItemSnapshot = Arc<[Item]>;

/// Write generation observed when a lookup missed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Outcome of a cache lookup.
#[derive(Debug, Clone)]
pub enum CacheLookup {
    Hit(ItemSnapshot),
    Miss(Generation),
}

/// Point-in-time cache counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub populations: u64,
    pub discarded_populations: u64,
    pub invalidations: u64,
}

#[derive(Debug, Default)]
struct CacheState {
    items: Option<ItemSnapshot>,
    generation: u64,
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    populations: AtomicU64,
    discarded_populations: AtomicU64,
    invalidations: AtomicU64,
}

/// Process-wide item cache with a populated/absent state machine.
#[derive(Debug, Default)]
pub struct ItemCache {
    state: RwLock<CacheState>,
    counters: Counters,
}

impl ItemCache {
    /// Creates an absent cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached snapshot when populated; never triggers population.
    pub fn read(&self) -> Option<ItemSnapshot> {
        match self.lookup() {
            CacheLookup::Hit(snapshot) => Some(snapshot),
            CacheLookup::Miss(_) => None,
        }
    }

    /// Returns the snapshot, or the generation a later population must match.
    pub fn lookup(&self) -> CacheLookup {
        // Poisoning cannot leave partial content: every write is a single assignment.
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        match &state.items {
            Some(items) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Hit(Arc::clone(items))
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                CacheLookup::Miss(Generation(state.generation))
            }
        }
    }

    /// Replaces any content wholesale with `items`.
    pub fn populate(&self, items: ItemSnapshot) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.items = Some(items);
        self.counters.populations.fetch_add(1, Ordering::Relaxed);
    }

    /// Installs `items` only if no invalidation happened since `observed`.
    ///
    /// Returns whether the snapshot was installed.
    pub fn populate_from(&self, items: ItemSnapshot, observed: Generation) -> bool {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation != observed.0 {
            self.counters
                .discarded_populations
                .fetch_add(1, Ordering::Relaxed);
            return false;
        }
        state.items = Some(items);
        self.counters.populations.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Drops any content. Idempotent.
    pub fn invalidate(&self) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        state.items = None;
        state.generation = state.generation.wrapping_add(1);
        self.counters.invalidations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn is_populated(&self) -> bool {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .items
            .is_some()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            populations: self.counters.populations.load(Ordering::Relaxed),
            discarded_populations: self.counters.discarded_populations.load(Ordering::Relaxed),
            invalidations: self.counters.invalidations.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CacheLookup, ItemCache, ItemSnapshot};
    use crate::assign::{Assigner, SystemAssigner};
    use crate::model::item::NewItem;
    use std::sync::Arc;

    fn snapshot(names: &[&str]) -> ItemSnapshot {
        names
            .iter()
            .map(|name| SystemAssigner.assign(&NewItem::new(*name)))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn starts_absent_and_read_does_not_populate() {
        let cache = ItemCache::new();
        assert!(cache.read().is_none());
        assert!(cache.read().is_none());
        assert!(!cache.is_populated());
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn populate_replaces_wholesale_and_invalidate_is_idempotent() {
        let cache = ItemCache::new();
        cache.populate(snapshot(&["A", "B"]));
        cache.populate(snapshot(&["C"]));

        let read = cache.read().expect("populated");
        assert_eq!(read.len(), 1);
        assert_eq!(read[0].name, "C");

        cache.invalidate();
        cache.invalidate();
        assert!(cache.read().is_none());
    }

    #[test]
    fn population_after_invalidation_is_discarded() {
        let cache = ItemCache::new();
        let observed = match cache.lookup() {
            CacheLookup::Miss(generation) => generation,
            CacheLookup::Hit(_) => panic!("fresh cache must miss"),
        };

        cache.invalidate();
        assert!(!cache.populate_from(snapshot(&["stale"]), observed));
        assert!(cache.read().is_none());
        assert_eq!(cache.stats().discarded_populations, 1);

        let current = match cache.lookup() {
            CacheLookup::Miss(generation) => generation,
            CacheLookup::Hit(_) => panic!("still absent"),
        };
        assert!(cache.populate_from(snapshot(&["fresh"]), current));
        assert_eq!(cache.read().expect("installed")[0].name, "fresh");
    }

    #[test]
    fn readers_share_the_same_snapshot() {
        let cache = ItemCache::new();
        cache.populate(snapshot(&["A"]));
        let first = cache.read().unwrap();
        let second = cache.read().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }
}
