//! # LFU (Least Frequently Used) Cache
//!
//! Evicts the entry with the lowest access count. Among entries sharing a
//! count, the one that reached that count least recently goes first.
//!
//! ## Architecture
//!
//! ```text
//!   index: FxHashMap<K, SlotId>          entries: SlotArena<Entry<K, V>>
//!   ┌────────┬───────┐                   ┌──────┬──────────────────────────┐
//!   │ page_a │ id_0 ─┼──────────────────►│ id_0 │ freq 3, prev/next        │
//!   │ page_b │ id_1 ─┼──────────────────►│ id_1 │ freq 1, prev/next        │
//!   │ page_c │ id_2 ─┼──────────────────►│ id_2 │ freq 1, prev/next        │
//!   └────────┴───────┘                   └──────┴──────────────────────────┘
//!
//!   buckets: FxHashMap<u64, FrequencyBucket>   (linked in ascending order)
//!
//!   min_freq = 1
//!       │
//!       ▼
//!   freq=1: head ─► [id_2] ◄──► [id_1] ◄─ tail   (tail evicted first)
//!       │ next
//!       ▼
//!   freq=3: head ─► [id_0] ◄─ tail
//! ```
//!
//! An entry's `freq` doubles as its handle to the bucket holding it; the
//! bucket never owns the entry.
//!
//! ## Frequency Lifecycle
//!
//! - `insert` (new key): freq = 1, head of bucket 1, `min_freq` = 1.
//! - `get` / `insert` (existing key): freq += 1, head of the next bucket.
//! - A bucket is created when its first entry arrives and dropped when its
//!   last entry leaves; `min_freq` follows the bucket links.
//!
//! ## Operations
//!
//! | Method                 | Time |
//! |------------------------|------|
//! | `get`                  | O(1) |
//! | `insert` (incl. evict) | O(1) |
//! | `remove`               | O(1) |
//! | `pop_lfu` / `peek_lfu` | O(1) |
//! | `clear`                | O(n) |
//!
//! ## Example
//!
//! ```
//! use evictkit::policy::lfu::LfuCache;
//! use evictkit::traits::{CoreCache, LfuCacheTrait};
//!
//! let mut cache = LfuCache::try_new(2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.get(&"a");
//! cache.insert("c", 3);
//!
//! assert_eq!(cache.frequency(&"a"), Some(3));
//! assert!(!cache.contains(&"b"));
//! ```

use std::fmt;
use std::hash::Hash;
use std::mem;
use std::num::NonZeroUsize;

use rustc_hash::FxHashMap;
use tracing::trace;

use super::initial_reservation;
use crate::ds::{SlotArena, SlotId};
use crate::error::ConfigError;
#[cfg(any(test, debug_assertions))]
use crate::error::InvariantError;
use crate::metrics::{CacheMetrics, CacheMetricsSnapshot, CoreMetricsRecorder};
use crate::traits::{CoreCache, LfuCacheTrait};

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    freq: u64,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

#[derive(Debug, Default)]
struct FrequencyBucket {
    head: Option<SlotId>,
    tail: Option<SlotId>,
    len: usize,
    prev: Option<u64>,
    next: Option<u64>,
}

/// Frequency-ordered cache with O(1) eviction through `min_freq`.
pub struct LfuCache<K, V> {
    entries: SlotArena<Entry<K, V>>,
    index: FxHashMap<K, SlotId>,
    buckets: FxHashMap<u64, FrequencyBucket>,
    // 0 only while empty
    min_freq: u64,
    capacity: usize,
    metrics: CacheMetrics,
}

impl<K, V> LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn new(capacity: NonZeroUsize) -> Self {
        let capacity = capacity.get();
        let reserve = initial_reservation(capacity);
        Self {
            entries: SlotArena::with_capacity(reserve),
            index: FxHashMap::with_capacity_and_hasher(reserve, Default::default()),
            buckets: FxHashMap::default(),
            min_freq: 0,
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

    fn insert_bucket(&mut self, freq: u64, prev: Option<u64>, next: Option<u64>) {
        self.buckets.insert(
            freq,
            FrequencyBucket {
                prev,
                next,
                ..Default::default()
            },
        );
        if let Some(prev_freq) = prev
            && let Some(bucket) = self.buckets.get_mut(&prev_freq)
        {
            bucket.next = Some(freq);
        }
        if let Some(next_freq) = next
            && let Some(bucket) = self.buckets.get_mut(&next_freq)
        {
            bucket.prev = Some(freq);
        }
        if prev.is_none() {
            self.min_freq = freq;
        }
    }

    fn remove_bucket(&mut self, freq: u64) {
        let Some(bucket) = self.buckets.remove(&freq) else {
            return;
        };
        if let Some(prev_freq) = bucket.prev
            && let Some(prev) = self.buckets.get_mut(&prev_freq)
        {
            prev.next = bucket.next;
        }
        if let Some(next_freq) = bucket.next
            && let Some(next) = self.buckets.get_mut(&next_freq)
        {
            next.prev = bucket.prev;
        }
        if self.min_freq == freq {
            self.min_freq = bucket.next.unwrap_or(0);
        }
    }

    fn push_front(&mut self, freq: u64, id: SlotId) {
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return;
        };
        let old_head = bucket.head;
        if let Some(entry) = self.entries.get_mut(id) {
            entry.prev = None;
            entry.next = old_head;
        }
        match old_head.and_then(|head| self.entries.get_mut(head)) {
            Some(head) => head.prev = Some(id),
            None => bucket.tail = Some(id),
        }
        bucket.head = Some(id);
        bucket.len += 1;
    }

    /// Unlinks `id` from bucket `freq`; returns `true` if the bucket is now empty.
    fn unlink(&mut self, id: SlotId, freq: u64) -> bool {
        let Some((prev, next)) = self
            .entries
            .get_mut(id)
            .map(|entry| (entry.prev.take(), entry.next.take()))
        else {
            return false;
        };
        let Some(bucket) = self.buckets.get_mut(&freq) else {
            return false;
        };
        match prev.and_then(|p| self.entries.get_mut(p)) {
            Some(prev_entry) => prev_entry.next = next,
            None => bucket.head = next,
        }
        match next.and_then(|n| self.entries.get_mut(n)) {
            Some(next_entry) => next_entry.prev = prev,
            None => bucket.tail = prev,
        }
        bucket.len -= 1;
        bucket.len == 0
    }

    /// Moves `id` to the head of the bucket for `freq + 1`.
    fn increment(&mut self, id: SlotId) -> Option<u64> {
        let freq = self.entries.get(id)?.freq;
        let new_freq = freq.saturating_add(1);
        if new_freq == freq {
            self.unlink(id, freq);
            self.push_front(freq, id);
            return Some(freq);
        }

        let (bucket_prev, bucket_next) = {
            let bucket = self.buckets.get(&freq)?;
            (bucket.prev, bucket.next)
        };
        let emptied = self.unlink(id, freq);
        if emptied {
            self.remove_bucket(freq);
        }
        if !self.buckets.contains_key(&new_freq) {
            let prev = if emptied { bucket_prev } else { Some(freq) };
            self.insert_bucket(new_freq, prev, bucket_next);
        }

        if let Some(entry) = self.entries.get_mut(id) {
            entry.freq = new_freq;
        }
        self.push_front(new_freq, id);
        Some(new_freq)
    }

    /// Detaches `id` from its bucket and frees it.
    fn take(&mut self, id: SlotId) -> Option<(K, V)> {
        let freq = self.entries.get(id)?.freq;
        if self.unlink(id, freq) {
            self.remove_bucket(freq);
        }
        let entry = self.entries.remove(id)?;
        self.index.remove(&entry.key);
        Some((entry.key, entry.value))
    }

    fn evict_lfu(&mut self) -> Option<(K, V)> {
        let id = self.buckets.get(&self.min_freq)?.tail?;
        self.take(id)
    }

    /// Verifies bucket links, per-entry frequencies and index consistency.
    #[cfg(any(test, debug_assertions))]
    pub fn check_invariants(&self) -> Result<(), InvariantError> {
        if self.index.len() != self.entries.len() {
            return Err(InvariantError::new("lfu index and entry arena disagree on length"));
        }
        if self.entries.len() > self.capacity {
            return Err(InvariantError::new("lfu holds more entries than capacity"));
        }
        if self.entries.is_empty() {
            if self.min_freq != 0 || !self.buckets.is_empty() {
                return Err(InvariantError::new("empty lfu still has buckets or a min_freq"));
            }
            return Ok(());
        }

        let smallest = self.buckets.keys().min().copied();
        if smallest != Some(self.min_freq) {
            return Err(InvariantError::new(format!(
                "lfu min_freq is {} but smallest bucket is {:?}",
                self.min_freq, smallest
            )));
        }

        let mut total = 0usize;
        for (&freq, bucket) in &self.buckets {
            if bucket.len == 0 {
                return Err(InvariantError::new(format!("lfu bucket {freq} is empty")));
            }
            match bucket.prev {
                Some(prev) if prev >= freq || self.buckets.get(&prev).and_then(|b| b.next) != Some(freq) => {
                    return Err(InvariantError::new(format!("lfu bucket {freq} has a broken prev link")));
                },
                None if freq != self.min_freq => {
                    return Err(InvariantError::new(format!("lfu bucket {freq} has no prev but is not min")));
                },
                _ => {},
            }
            if let Some(next) = bucket.next
                && (next <= freq || self.buckets.get(&next).and_then(|b| b.prev) != Some(freq))
            {
                return Err(InvariantError::new(format!("lfu bucket {freq} has a broken next link")));
            }

            let mut count = 0usize;
            let mut last = None;
            let mut current = bucket.head;
            while let Some(id) = current {
                let entry = self
                    .entries
                    .get(id)
                    .ok_or_else(|| InvariantError::new("lfu bucket links to a vacant slot"))?;
                if entry.freq != freq {
                    return Err(InvariantError::new(format!(
                        "lfu entry with freq {} sits in bucket {freq}",
                        entry.freq
                    )));
                }
                if entry.prev != last {
                    return Err(InvariantError::new("lfu entry prev link is not symmetric"));
                }
                count += 1;
                if count > bucket.len {
                    return Err(InvariantError::new(format!("lfu bucket {freq} is longer than its len")));
                }
                last = Some(id);
                current = entry.next;
            }
            if last != bucket.tail || count != bucket.len {
                return Err(InvariantError::new(format!("lfu bucket {freq} tail or len is stale")));
            }
            total += count;
        }
        if total != self.entries.len() {
            return Err(InvariantError::new("lfu buckets do not cover every entry"));
        }

        for (key, id) in &self.index {
            match self.entries.get(*id) {
                Some(entry) if entry.key == *key => {},
                _ => return Err(InvariantError::new("lfu index points at the wrong entry")),
            }
        }
        Ok(())
    }
}

impl<K, V> CoreCache<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        if let Some(&id) = self.index.get(&key) {
            self.metrics.record_insert_update();
            let old = self
                .entries
                .get_mut(id)
                .map(|entry| mem::replace(&mut entry.value, value));
            self.increment(id);
            return old;
        }

        if self.index.len() >= self.capacity && self.evict_lfu().is_some() {
            self.metrics.record_evicted_entry();
            trace!(policy = "lfu", capacity = self.capacity, "evicted least frequently used entry");
        }

        self.metrics.record_insert_new();
        let id = self.entries.insert(Entry {
            key: key.clone(),
            value,
            freq: 1,
            prev: None,
            next: None,
        });
        self.index.insert(key, id);
        if !self.buckets.contains_key(&1) {
            let next = (self.min_freq != 0).then_some(self.min_freq);
            self.insert_bucket(1, None, next);
        }
        self.push_front(1, id);
        // A fresh entry is always the new minimum.
        self.min_freq = 1;
        None
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        let Some(&id) = self.index.get(key) else {
            self.metrics.record_get_miss();
            return None;
        };
        self.increment(id);
        self.metrics.record_get_hit();
        self.entries.get(id).map(|entry| &entry.value)
    }

    fn peek(&self, key: &K) -> Option<&V> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| &entry.value)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        let id = *self.index.get(key)?;
        let (_, value) = self.take(id)?;
        self.metrics.record_removal();
        Some(value)
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
        self.entries.clear();
        self.index.clear();
        self.buckets.clear();
        self.min_freq = 0;
        self.metrics.record_clear();
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.metrics.snapshot_with(self.len(), self.capacity)
    }
}

impl<K, V> LfuCacheTrait<K, V> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn pop_lfu(&mut self) -> Option<(K, V)> {
        let popped = self.evict_lfu()?;
        self.metrics.record_removal();
        Some(popped)
    }

    fn peek_lfu(&self) -> Option<(&K, &V)> {
        let id = self.buckets.get(&self.min_freq)?.tail?;
        self.entries.get(id).map(|entry| (&entry.key, &entry.value))
    }

    fn frequency(&self, key: &K) -> Option<u64> {
        let id = *self.index.get(key)?;
        self.entries.get(id).map(|entry| entry.freq)
    }
}

impl<K, V> Extend<(K, V)> for LfuCache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> fmt::Debug for LfuCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCache")
            .field("len", &self.index.len())
            .field("capacity", &self.capacity)
            .field("min_freq", &self.min_freq)
            .field("buckets", &self.buckets.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bucket_keys<K: Clone, V>(cache: &LfuCache<K, V>, freq: u64) -> Vec<K> {
        let mut keys = Vec::new();
        let mut current = cache.buckets.get(&freq).and_then(|b| b.head);
        while let Some(id) = current {
            let entry = cache.entries.get(id).unwrap();
            keys.push(entry.key.clone());
            current = entry.next;
        }
        keys
    }

    mod basic_behavior {
        use super::*;

        #[test]
        fn zero_capacity_is_rejected() {
            assert!(LfuCache::<u32, u32>::try_new(0).is_err());
        }

        #[test]
        fn insert_get_and_frequencies() {
            let mut cache = LfuCache::try_new(3).unwrap();
            assert_eq!(cache.insert("k1", 100), None);
            assert_eq!(cache.insert("k2", 200), None);

            assert_eq!(cache.get(&"k1"), Some(&100));
            assert_eq!(cache.get(&"missing"), None);
            assert_eq!(cache.frequency(&"k1"), Some(2));
            assert_eq!(cache.frequency(&"k2"), Some(1));
            assert_eq!(cache.frequency(&"missing"), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn update_replaces_value_and_bumps_frequency() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("a", 1);
            assert_eq!(cache.insert("a", 2), Some(1));
            assert_eq!(cache.peek(&"a"), Some(&2));
            assert_eq!(cache.frequency(&"a"), Some(2));
            assert_eq!(cache.len(), 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn peek_does_not_bump_frequency() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("a", 1);
            cache.peek(&"a");
            cache.contains(&"a");
            assert_eq!(cache.frequency(&"a"), Some(1));
            assert_eq!(cache.metrics_snapshot().total_gets(), 0);
        }

        #[test]
        fn clear_resets_everything() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("a", 1);
            cache.get(&"a");
            cache.get(&"b");
            cache.clear();

            assert!(cache.is_empty());
            assert_eq!(cache.hit_rate(), 0.0);
            assert_eq!(cache.min_freq, 0);
            assert!(cache.buckets.is_empty());
            assert_eq!(cache.get(&"a"), None);
            cache.check_invariants().unwrap();
        }
    }

    mod eviction_order {
        use super::*;

        #[test]
        fn evicts_lowest_frequency() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("A", 1);
            cache.insert("B", 2);
            cache.get(&"A");
            cache.get(&"A");
            cache.insert("C", 3);

            assert!(cache.contains(&"A"));
            assert!(!cache.contains(&"B"));
            assert!(cache.contains(&"C"));
            assert_eq!(cache.frequency(&"A"), Some(3));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn ties_break_by_recency_within_bucket() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            assert_eq!(bucket_keys(&cache, 1), vec!["c", "b", "a"]);

            cache.insert("d", 4);
            assert!(!cache.contains(&"a"));
            cache.insert("e", 5);
            assert!(!cache.contains(&"b"));
        }

        #[test]
        fn promoted_entries_tie_break_by_promotion_time() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.insert("c", 3);
            cache.get(&"b");
            cache.get(&"a");
            cache.get(&"c");
            // all at freq 2; b reached it first
            assert_eq!(bucket_keys(&cache, 2), vec!["c", "a", "b"]);
            assert_eq!(cache.peek_lfu(), Some((&"b", &2)));

            cache.insert("d", 4);
            assert!(!cache.contains(&"b"));
            // d is alone at freq 1 and goes next
            assert_eq!(cache.peek_lfu(), Some((&"d", &4)));
            cache.insert("e", 5);
            assert!(!cache.contains(&"d"));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn fresh_insert_forces_min_freq_to_one() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert("a", 1);
            cache.get(&"a");
            cache.get(&"a");
            assert_eq!(cache.min_freq, 3);

            cache.insert("b", 2);
            assert_eq!(cache.min_freq, 1);
            cache.insert("c", 3);
            cache.insert("d", 4);

            assert!(!cache.contains(&"b"));
            assert!(cache.contains(&"a"));
            assert!(cache.contains(&"c"));
            assert_eq!(cache.min_freq, 1);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn emptied_min_bucket_advances_to_next() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert("a", 1);
            cache.insert("b", 2);
            cache.get(&"b");
            cache.get(&"b");
            cache.get(&"b");

            assert_eq!(cache.remove(&"a"), Some(1));
            assert_eq!(cache.min_freq, 4);
            assert_eq!(cache.peek_lfu(), Some((&"b", &2)));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn increment_out_of_sole_min_bucket_follows() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("a", 1);
            cache.get(&"a");
            assert_eq!(cache.min_freq, 2);
            assert!(!cache.buckets.contains_key(&1));
            cache.get(&"a");
            assert_eq!(cache.min_freq, 3);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn increment_into_gap_links_between_buckets() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert("a", ());
            cache.insert("b", ());
            for _ in 0..4 {
                cache.get(&"b");
            }
            cache.insert("c", ());
            cache.get(&"a");
            cache.get(&"a");
            // buckets now 1 (c), 3 (a), 5 (b)
            assert_eq!(cache.buckets.get(&3).and_then(|b| b.prev), Some(1));
            assert_eq!(cache.buckets.get(&3).and_then(|b| b.next), Some(5));
            cache.check_invariants().unwrap();
        }

        #[test]
        fn capacity_bound_holds() {
            let mut cache = LfuCache::try_new(4).unwrap();
            for i in 0..100u32 {
                cache.insert(i, i);
                if i % 3 == 0 {
                    cache.get(&i);
                }
                assert!(cache.len() <= 4);
            }
            cache.check_invariants().unwrap();
        }
    }

    mod trait_operations {
        use super::*;

        #[test]
        fn pop_lfu_drains_in_eviction_order() {
            let mut cache = LfuCache::try_new(3).unwrap();
            assert_eq!(cache.pop_lfu(), None);
            assert_eq!(cache.peek_lfu(), None);

            cache.insert(1, "a");
            cache.insert(2, "b");
            cache.insert(3, "c");
            cache.get(&1);

            assert_eq!(cache.pop_lfu(), Some((2, "b")));
            assert_eq!(cache.pop_lfu(), Some((3, "c")));
            assert_eq!(cache.pop_lfu(), Some((1, "a")));
            assert_eq!(cache.pop_lfu(), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn remove_from_middle_of_bucket() {
            let mut cache = LfuCache::try_new(3).unwrap();
            cache.insert(1, ());
            cache.insert(2, ());
            cache.insert(3, ());
            assert_eq!(cache.remove(&2), Some(()));
            assert_eq!(bucket_keys(&cache, 1), vec![3, 1]);
            assert_eq!(cache.remove(&2), None);
            cache.check_invariants().unwrap();
        }

        #[test]
        fn saturated_frequency_stays_put() {
            let mut cache = LfuCache::try_new(2).unwrap();
            cache.insert("a", 1);
            let id = cache.index[&"a"];
            cache.unlink(id, 1);
            cache.remove_bucket(1);
            cache.insert_bucket(u64::MAX, None, None);
            cache.entries.get_mut(id).unwrap().freq = u64::MAX;
            cache.push_front(u64::MAX, id);

            cache.get(&"a");
            assert_eq!(cache.frequency(&"a"), Some(u64::MAX));
            cache.check_invariants().unwrap();
        }
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;
        use std::collections::BTreeMap;

        #[derive(Debug, Clone)]
        enum Op {
            Insert(u8, u32),
            Get(u8),
            Remove(u8),
        }

        fn op_strategy() -> impl Strategy<Value = Op> {
            prop_oneof![
                (0u8..12, any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
                (0u8..12).prop_map(Op::Get),
                (0u8..12).prop_map(Op::Remove),
            ]
        }

        // key -> (value, freq, tick at which it entered its current bucket)
        type Model = BTreeMap<u8, (u32, u64, u64)>;

        proptest! {
            #[test]
            fn prop_matches_frequency_model(
                capacity in 1usize..6,
                ops in prop::collection::vec(op_strategy(), 0..150)
            ) {
                let mut cache = LfuCache::try_new(capacity).unwrap();
                let mut model = Model::new();
                let mut tick = 0u64;
                let mut gets = 0u64;

                for op in ops {
                    tick += 1;
                    match op {
                        Op::Insert(k, v) => {
                            let expected = match model.get_mut(&k) {
                                Some(slot) => {
                                    let old = slot.0;
                                    *slot = (v, slot.1 + 1, tick);
                                    Some(old)
                                },
                                None => {
                                    if model.len() == capacity {
                                        let victim = model
                                            .iter()
                                            .min_by_key(|(_, (_, freq, at))| (*freq, *at))
                                            .map(|(key, _)| *key)
                                            .unwrap();
                                        model.remove(&victim);
                                    }
                                    model.insert(k, (v, 1, tick));
                                    None
                                },
                            };
                            prop_assert_eq!(cache.insert(k, v), expected);
                        },
                        Op::Get(k) => {
                            gets += 1;
                            let expected = model.get_mut(&k).map(|slot| {
                                slot.1 += 1;
                                slot.2 = tick;
                                slot.0
                            });
                            prop_assert_eq!(cache.get(&k).copied(), expected);
                        },
                        Op::Remove(k) => {
                            let expected = model.remove(&k).map(|slot| slot.0);
                            prop_assert_eq!(cache.remove(&k), expected);
                        },
                    }

                    prop_assert!(cache.len() <= capacity);
                    prop_assert_eq!(cache.len(), model.len());
                    prop_assert_eq!(cache.metrics_snapshot().total_gets(), gets);
                    for (k, (v, freq, _)) in &model {
                        prop_assert_eq!(cache.peek(k), Some(v));
                        prop_assert_eq!(cache.frequency(k), Some(*freq));
                    }
                    prop_assert!(cache.check_invariants().is_ok());
                }
            }
        }
    }
}
