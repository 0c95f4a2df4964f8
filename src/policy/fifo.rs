//! # First In, First Out (FIFO) Cache
//!
//! Evicts the entry that was inserted earliest. Reads and value updates do
//! not change an entry's position.
//!
//! ```text
//!   index: FxHashMap<K, SlotId>
//!
//!   list: IntrusiveList<Entry<K, V>>
//!   head ──► [newest] ◄──► [ ... ] ◄──► [oldest] ◄── tail
//!                                        evicted first
//! ```
//!
//! | Method        | Time | Effect on order           |
//! |---------------|------|---------------------------|
//! | `get`         | O(1) | none                      |
//! | `insert` new  | O(1) | pushes at head            |
//! | `insert` old  | O(1) | replaces value in place   |
//! | `remove`      | O(1) | unlinks                   |
//! | `age_rank`    | O(n) | none                      |
//!
//! ```
//! use evictkit::policy::fifo::FifoCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = FifoCache::try_new(2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert!(!cache.contains(&"a"));
//! assert!(cache.contains(&"b"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::initial_reservation;
use crate::ds::{IntrusiveList, SlotId};
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::metrics::{CacheMetrics, CacheMetricsSnapshot, CoreMetricsRecorder};
use crate::traits::{CoreCache, FifoCacheTrait};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Insertion-ordered cache.
pub struct FifoCache<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    metrics: CacheMetrics,
}

impl<K, V> FifoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        let reserve = initial_reservation(capacity);
        Self {
            list: IntrusiveList::with_capacity(reserve),
            index: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            capacity,
            metrics: CacheMetrics::new(),
        }
    }

    /// Fallible constructor; a zero capacity is rejected.
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or_else(ConfigError::zero_capacity)
    }

    fn evict_oldest(&mut self) -> Option<(K, V)> {
        let Entry { key, value } = self.list.pop_back()?;
        self.index.remove(&key);
        Some((key, value))
    }

    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new("fifo index and queue disagree on length"));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new("fifo holds more entries than capacity"));
        }
        for (key, id) in &self.index {
            match self.list.get(*id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("fifo index points at the wrong node")),
            }
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for FifoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.metrics.record_insert_update();
            return self
                .list
                .get_mut(id)
                .map(|entry| mem::replace(&mut entry.value, value));
        }

        if self.index.len() >= self.capacity && self.evict_oldest().is_some() {
            self.metrics.record_evicted_entry();
            trace!(policy = "fifo", capacity = self.capacity, "evicted oldest entry");
        }

        self.metrics.record_insert_new();
        let id = self.list.push_front(Entry {
            key: key.clone(),
            value,
        });
        self.index.insert(key, id);
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        match self.index.get(key) {
            Some(&id) => {
                self.metrics.record_get_hit();
                self.list.get(id).map(|entry| &entry.value)
            },
            None => {
                self.metrics.record_get_miss();
                None
            },
        }
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.list.get(id).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let id = self.index.remove(key)?;
        let entry = self.list.remove(id)?;
        self.metrics.record_removal();
        Some(entry.value)
    }

    fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn capacity(&self) -> usize {
        self.capacity
    }

    fn clear(&mut self) {
        self.list.clear();
        self.index.clear();
        self.metrics.record_clear();
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot_with(self.len(), self.capacity)
    }
}

impl<K, V> FifoCacheTrait<K, V> for FifoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_oldest(&mut self) -> Option<(K, V)> {
        let popped = self.evict_oldest()?;
        self.metrics.record_removal();
        Some(popped)
    }

    fn peek_oldest(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    fn age_rank(&self, key: &K) -> Option<usize> {
        self.list.iter_rev().position(|entry| entry.key == *key)
    }
}

impl<K, V> Extend<(K, V)> for FifoCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> fmt::Debug for FifoCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FifoCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
