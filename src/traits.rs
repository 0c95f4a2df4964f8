//! # Cache Trait Hierarchy
//!
//! Every store implements [`CoreCache`], the contract callers program
//! against. Policy-specific traits add the operations that only make sense
//! for one ordering.
//!
//! ```text
//!                   ┌──────────────────────────────────────┐
//!                   │           CoreCache<K, V>            │
//!                   │                                      │
//!                   │  insert(&mut, K, V) → Option<V>      │
//!                   │  get(&mut, &K) → Option<&V>          │
//!                   │  peek(&, &K) → Option<&V>            │
//!                   │  remove(&mut, &K) → Option<V>        │
//!                   │  contains / len / capacity / clear   │
//!                   │  metrics_snapshot / hit_rate         │
//!                   └──────────────────┬───────────────────┘
//!                                      │
//!          ┌───────────────────────────┼───────────────────────────┐
//!          ▼                           ▼                           ▼
//!  ┌────────────────────┐   ┌────────────────────┐   ┌────────────────────┐
//!  │ LruCacheTrait      │   │ LfuCacheTrait      │   │ FifoCacheTrait     │
//!  │  pop_lru/peek_lru  │   │  pop_lfu/peek_lfu  │   │  pop_oldest        │
//!  │  touch             │   │  frequency         │   │  peek_oldest       │
//!  │  recency_rank      │   │                    │   │  age_rank          │
//!  └────────────────────┘   └────────────────────┘   └────────────────────┘
//! ```
//!
//! ## Thread Safety
//!
//! Stores are **not** thread-safe: mutation needs `&mut self`. Wrap one in
//! [`ThreadSafeCache`](crate::concurrent::ThreadSafeCache) to share it.
//! [`ConcurrentCache`] marks types that are safe to share.

use crate::metrics::CacheMetricsSnapshot;

/// Operations every eviction policy supports.
///
/// # Example
///
/// ```
/// use evictkit::traits::CoreCache;
/// use evictkit::policy::lru::LruCache;
///
/// fn warm<C: CoreCache<u64, String>>(cache: &mut C, data: &[(u64, String)]) {
///     for (key, value) in data {
///         cache.insert(*key, value.clone());
///     }
/// }
///
/// let mut cache = LruCache::try_new(100).unwrap();
/// warm(&mut cache, &[(1, "one".to_string()), (2, "two".to_string())]);
/// assert_eq!(cache.len(), 2);
/// ```
pub trait CoreCache<K, V> {
    /// Inserts or updates `key`, returning the previous value if it existed.
    ///
    /// Inserting a new key into a full cache evicts one entry first,
    /// chosen by the policy.
    fn insert(&mut self, key: K, value: V) -> Option<V>;

    /// Looks up `key`, counting a hit or a miss.
    ///
    /// May reorder the entry (LRU recency, LFU frequency). Use
    /// [`peek`](Self::peek) to read without side effects.
    fn get(&mut self, key: &K) -> Option<&V>;

    /// Reads `key` without touching eviction order or statistics.
    fn peek(&self, key: &K) -> Option<&V>;

    /// Removes `key`, returning its value if it was present.
    fn remove(&mut self, key: &K) -> Option<V>;

    /// Checks for `key` without touching eviction order or statistics.
    fn contains(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of entries; always greater than zero.
    fn capacity(&self) -> usize;

    /// Drops every entry and resets statistics.
    fn clear(&mut self);

    /// Current counters and gauges.
    fn metrics_snapshot(&self) -> CacheMetricsSnapshot;

    /// Fraction of `get` calls that hit, in `[0, 1]`; `0.0` before any lookup.
    ///
    /// ```
    /// use evictkit::traits::CoreCache;
    /// use evictkit::policy::fifo::FifoCache;
    ///
    /// let mut cache = FifoCache::try_new(4).unwrap();
    /// cache.get(&1);
    /// cache.insert(1, "one");
    /// cache.get(&1);
    /// assert_eq!(cache.hit_rate(), 0.5);
    /// ```
    fn hit_rate(&self) -> f64 {
        self.metrics_snapshot().hit_rate()
    }
}

/// Recency-ordered operations.
///
/// ```
/// use evictkit::traits::{CoreCache, LruCacheTrait};
/// use evictkit::policy::lru::LruCache;
///
/// let mut cache = LruCache::try_new(3).unwrap();
/// cache.insert(1, "a");
/// cache.insert(2, "b");
/// cache.insert(3, "c");
/// cache.get(&1);
///
/// assert_eq!(cache.peek_lru(), Some((&2, &"b")));
/// assert!(cache.touch(&2));
/// assert_eq!(cache.pop_lru(), Some((3, "c")));
/// ```
pub trait LruCacheTrait<K, V>: CoreCache<K, V> {
    /// Removes and returns the least recently used entry.
    fn pop_lru(&mut self) -> Option<(K, V)>;

    /// Returns the least recently used entry without removing it.
    fn peek_lru(&self) -> Option<(&K, &V)>;

    /// Marks `key` as most recently used without reading it or counting a hit.
    fn touch(&mut self, key: &K) -> bool;

    /// Position from the MRU end (0 = most recent). O(n).
    fn recency_rank(&self, key: &K) -> Option<usize>;
}

/// Frequency-ordered operations.
pub trait LfuCacheTrait<K, V>: CoreCache<K, V> {
    /// Removes and returns the eviction candidate.
    fn pop_lfu(&mut self) -> Option<(K, V)>;

    /// Returns the eviction candidate without removing it.
    fn peek_lfu(&self) -> Option<(&K, &V)>;

    /// Current access count of `key` (1 right after insertion).
    fn frequency(&self, key: &K) -> Option<u64>;
}

/// Insertion-ordered operations.
pub trait FifoCacheTrait<K, V>: CoreCache<K, V> {
    /// Removes and returns the oldest entry.
    fn pop_oldest(&mut self) -> Option<(K, V)>;

    /// Returns the oldest entry without removing it.
    fn peek_oldest(&self) -> Option<(&K, &V)>;

    /// Removes up to `count` oldest entries, oldest first.
    fn pop_oldest_batch(&mut self, count: usize) -> Vec<(K, V)> {
        (0..count).map_while(|_| self.pop_oldest()).collect()
    }

    /// Position from the oldest end (0 = oldest). O(n).
    fn age_rank(&self, key: &K) -> Option<usize>;
}

/// Marker for caches that may be shared between threads.
///
/// ```
/// use evictkit::traits::ConcurrentCache;
///
/// fn share<C: ConcurrentCache + 'static>(cache: std::sync::Arc<C>) {
///     std::thread::spawn(move || drop(cache)).join().unwrap();
/// }
/// ```
pub trait ConcurrentCache: Send + Sync {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{CacheMetrics, CoreMetricsRecorder};

    // Minimal Vec-backed FIFO used to exercise the default methods.
    struct VecFifo {
        data: Vec<(i32, String)>,
        capacity: usize,
        metrics: CacheMetrics,
    }

    impl VecFifo {
        fn new(capacity: usize) -> Self {
            Self {
                data: Vec::new(),
                capacity,
                metrics: CacheMetrics::new(),
            }
        }
    }

    impl CoreCache<i32, String> for VecFifo {
        fn insert(&mut self, key: i32, value: String) -> Option<String> {
            if let Some((_, existing)) = self.data.iter_mut().find(|(k, _)| *k == key) {
                return Some(std::mem::replace(existing, value));
            }
            if self.data.len() >= self.capacity {
                self.data.remove(0);
            }
            self.data.push((key, value));
            None
        }

        fn get(&mut self, key: &i32) -> Option<&String> {
            match self.data.iter().position(|(k, _)| k == key) {
                Some(pos) => {
                    self.metrics.record_get_hit();
                    Some(&self.data[pos].1)
                },
                None => {
                    self.metrics.record_get_miss();
                    None
                },
            }
        }

        fn peek(&self, key: &i32) -> Option<&String> {
            self.data.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        }

        fn remove(&mut self, key: &i32) -> Option<String> {
            let pos = self.data.iter().position(|(k, _)| k == key)?;
            Some(self.data.remove(pos).1)
        }

        fn contains(&self, key: &i32) -> bool {
            self.peek(key).is_some()
        }

        fn len(&self) -> usize {
            self.data.len()
        }

        fn capacity(&self) -> usize {
            self.capacity
        }

        fn clear(&mut self) {
            self.data.clear();
            self.metrics.record_clear();
        }

        fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
            self.metrics.snapshot_with(self.data.len(), self.capacity)
        }
    }

    impl FifoCacheTrait<i32, String> for VecFifo {
        fn pop_oldest(&mut self) -> Option<(i32, String)> {
            if self.data.is_empty() {
                None
            } else {
                Some(self.data.remove(0))
            }
        }

        fn peek_oldest(&self) -> Option<(&i32, &String)> {
            self.data.first().map(|(k, v)| (k, v))
        }

        fn age_rank(&self, key: &i32) -> Option<usize> {
            self.data.iter().position(|(k, _)| k == key)
        }
    }

    #[test]
    fn default_is_empty_and_hit_rate() {
        let mut cache = VecFifo::new(2);
        assert!(cache.is_empty());
        assert_eq!(cache.hit_rate(), 0.0);

        cache.insert(1, "one".to_string());
        cache.get(&1);
        cache.get(&2);
        assert!(!cache.is_empty());
        assert_eq!(cache.hit_rate(), 0.5);

        cache.clear();
        assert_eq!(cache.hit_rate(), 0.0);
    }

    #[test]
    fn default_pop_oldest_batch_stops_when_empty() {
        let mut cache = VecFifo::new(4);
        cache.insert(1, "a".to_string());
        cache.insert(2, "b".to_string());

        let batch = cache.pop_oldest_batch(5);
        assert_eq!(batch, vec![(1, "a".to_string()), (2, "b".to_string())]);
        assert!(cache.is_empty());
    }
}
