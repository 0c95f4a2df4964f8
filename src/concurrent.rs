//! Lock-based thread-safe wrapper for any [`CoreCache`].
//!
//! [`ThreadSafeCache`] adds no policy logic: every call takes one
//! `parking_lot::RwLock` around the wrapped store and forwards. `get` takes
//! the write lock because lookups reorder entries and count hits; pure
//! observers (`len`, `capacity`, `hit_rate`, `peek`, `contains`,
//! `metrics_snapshot`) share the read lock.
//!
//! ```text
//!   ThreadSafeCache ──clone──► ThreadSafeCache
//!         │                          │
//!         └──────────► Arc<RwLock<C>> ◄──┘
//!                             │
//!                  LruCache / LfuCache / FifoCache / Cache
//! ```
//!
//! Values leave the lock by clone, so `get` requires `V: Clone`. Wrap large
//! values in `Arc<V>` to keep that cheap.

use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::metrics::CacheMetricsSnapshot;
use crate::traits::{ConcurrentCache, CoreCache};

/// Shares one cache between threads behind a read/write lock.
///
/// ```
/// use evictkit::concurrent::ThreadSafeCache;
/// use evictkit::policy::lru::LruCache;
///
/// let cache = ThreadSafeCache::new(LruCache::try_new(2).unwrap());
/// cache.insert("a", 1);
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert!(cache.delete(&"a"));
/// assert!(!cache.delete(&"a"));
/// ```
pub struct ThreadSafeCache<K, V, C> {
    inner: Arc<RwLock<C>>,
    _marker: PhantomData<fn() -> (K, V)>,
}

impl<K, V, C> ThreadSafeCache<K, V, C>
where
    C: CoreCache<K, V>,
{
    /// Takes ownership of `cache`; all further access goes through the lock.
    pub fn new(cache: C) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
            _marker: PhantomData,
        }
    }

    /// Looks up `key` under the write lock and returns a clone of the value.
    pub fn get(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.write().get(key).cloned()
    }

    /// Reads `key` under the read lock without touching order or statistics.
    pub fn peek(&self, key: &K) -> Option<V>
    where
        V: Clone,
    {
        self.inner.read().peek(key).cloned()
    }

    pub fn insert(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    /// Removes `key`; `true` if it was present.
    pub fn delete(&self, key: &K) -> bool {
        self.remove(key).is_some()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn hit_rate(&self) -> f64 {
        self.inner.read().hit_rate()
    }

    pub fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        self.inner.read().metrics_snapshot()
    }

    /// Runs `f` against the store while holding the read lock.
    pub fn with_read<R>(&self, f: impl FnOnce(&C) -> R) -> R {
        f(&self.inner.read())
    }

    /// Runs `f` against the store while holding the write lock, so several
    /// operations happen as one critical section.
    ///
    /// ```
    /// use evictkit::concurrent::ThreadSafeCache;
    /// use evictkit::policy::fifo::FifoCache;
    /// use evictkit::traits::CoreCache;
    ///
    /// let cache = ThreadSafeCache::new(FifoCache::try_new(4).unwrap());
    /// let inserted = cache.with_write(|store| {
    ///     if store.contains(&1) {
    ///         false
    ///     } else {
    ///         store.insert(1, "one");
    ///         true
    ///     }
    /// });
    /// assert!(inserted);
    /// ```
    pub fn with_write<R>(&self, f: impl FnOnce(&mut C) -> R) -> R {
        f(&mut self.inner.write())
    }

    /// Returns the store if this is the last handle to it.
    pub fn into_inner(self) -> Result<C, Self> {
        Arc::try_unwrap(self.inner)
            .map(RwLock::into_inner)
            .map_err(|inner| Self {
                inner,
                _marker: PhantomData,
            })
    }
}

impl<K, V, C> Clone for ThreadSafeCache<K, V, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            _marker: PhantomData,
        }
    }
}

impl<K, V, C> From<C> for ThreadSafeCache<K, V, C>
where
    C: CoreCache<K, V>,
{
    fn from(cache: C) -> Self {
        Self::new(cache)
    }
}

impl<K, V, C> fmt::Debug for ThreadSafeCache<K, V, C>
where
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ThreadSafeCache")
            .field("inner", &*self.inner.read())
            .finish()
    }
}

impl<K, V, C> ConcurrentCache for ThreadSafeCache<K, V, C> where C: Send + Sync {}
