//! # Least Recently Used (LRU) Cache
//!
//! Evicts the entry that has gone longest without being read or written.
//!
//! ## Architecture
//!
//! ```text
//!   ┌──────────────────────────────────────────────────────────────────────┐
//!   │                          LruCache<K, V>                              │
//!   │                                                                      │
//!   │   index: FxHashMap<K, SlotId>                                        │
//!   │   ┌─────────┬────────┐                                               │
//!   │   │ page_1  │  id_0 ─┼──────────────────────────────┐                │
//!   │   │ page_2  │  id_1 ─┼────────────────┐             │                │
//!   │   │ page_3  │  id_2 ─┼──┐             │             │                │
//!   │   └─────────┴────────┘  │             │             │                │
//!   │                         ▼             ▼             ▼                │
//!   │   list: IntrusiveList<Entry<K, V>>                                   │
//!   │   head ──► [page_3] ◄──► [page_2] ◄──► [page_1] ◄── tail             │
//!   │             (MRU)                       (LRU, evicted first)         │
//!   └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Operations
//!
//! | Method         | Time | Effect on order                         |
//! |----------------|------|-----------------------------------------|
//! | `get`          | O(1) | moves hit to head                       |
//! | `insert` (new) | O(1) | pushes at head, evicts tail when full   |
//! | `insert` (old) | O(1) | replaces value, moves to head           |
//! | `peek`         | O(1) | none                                    |
//! | `remove`       | O(1) | unlinks                                 |
//! | `touch`        | O(1) | moves to head, no hit recorded          |
//!
//! ## Thread Safety
//!
//! `LruCache` is not thread-safe; `get` needs `&mut self` because it
//! reorders. Share it through
//! [`ThreadSafeCache`](crate::concurrent::ThreadSafeCache).
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lru::LruCache;
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = LruCache::try_new(2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert!(cache.contains(&"a"));
//! assert!(!cache.contains(&"b"));
//! assert!(cache.contains(&"c"));
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
use crate::traits::{CoreCache, LruCacheTrait};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
}

/// Recency-ordered cache with O(1) get, insert and remove.
pub struct LruCache<K, V> {
    list: IntrusiveList<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    capacity: usize,
    metrics: CacheMetrics,
}

impl<K, V> LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty cache holding at most `capacity` entries.
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
    ///
    /// ```
    /// use evictkit::policy::lru::LruCache;
    ///
    /// assert!(LruCache::<u32, u32>::try_new(0).is_err());
    /// assert!(LruCache::<u32, u32>::try_new(1).is_ok());
    /// ```
    pub fn try_new(capacity: usize) -> Result<Self, ConfigError> {
        NonZeroUsize::new(capacity)
            .map(Self::new)
            .ok_or_else(ConfigError::zero_capacity)
    }

    fn evict_lru(&mut self) -> Option<(K, V)> {
        let Entry { key, value } = self.list.pop_back()?;
        self.index.remove(&key);
        Some((key, value))
    }

    /// Verifies that the index and the recency list describe the same entries.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        self.list.check_invariants()?;
        if self.index.len() != self.list.len() {
            return Err(InvariantError::new(format!(
                "lru index has {} keys but list has {} nodes",
                self.index.len(),
                self.list.len()
            )));
        }
        if self.list.len() > self.capacity {
            return Err(InvariantError::new("lru holds more entries than capacity"));
        }
        for (key, id) in &self.index {
            match self.list.get(*id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("lru index points at the wrong node")),
            }
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.metrics.record_insert_update();
            self.list.move_to_front(id);
            return self
                .list
                .get_mut(id)
                .map(|entry| mem::replace(&mut entry.value, value));
        }

        if self.index.len() >= self.capacity && self.evict_lru().is_some() {
            self.metrics.record_evicted_entry();
            trace!(policy = "lru", capacity = self.capacity, "evicted least recently used entry");
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
        let Some(&id) = self.index.get(key) else {
            self.metrics.record_get_miss();
            return None;
        };
        self.list.move_to_front(id);
        self.metrics.record_get_hit();
        self.list.get(id).map(|entry| &entry.value)
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

impl<K, V> LruCacheTrait<K, V> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lru(&mut self) -> Option<(K, V)> {
        let popped = self.evict_lru()?;
        self.metrics.record_removal();
        Some(popped)
    }

    fn peek_lru(&self) -> Option<(&K, &V)> {
        self.list.back().map(|entry| (&entry.key, &entry.value))
    }

    fn touch(&mut self, key: &K) -> bool {
        match self.index.get(key) {
            Some(&id) => self.list.move_to_front(id),
            None => false,
        }
    }

    fn recency_rank(&self, key: &K) -> Option<usize> {
        self.list.iter().position(|entry| entry.key == *key)
    }
}

impl<K, V> Extend<(K, V)> for LruCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> fmt::Debug for LruCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LruCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("metrics", &self.metrics)
            .finish_non_exhaustive()
    }
}
