//! Policy selection and cache construction.
//!
//! The factory functions hide which store backs a cache: callers pick a
//! [`CachePolicy`] and a capacity and get back a [`Cache`], which forwards
//! every [`CoreCache`] operation to the selected store.
//!
//! ## Example
//!
//! ```rust
//! use evictkit::builder::{create, CachePolicy};
//! use evictkit::traits::CoreCache;
//!
//! let mut cache = create::<u64, String>(CachePolicy::Lru, 100).unwrap();
//! cache.insert(1, "hello".to_string());
//! assert_eq!(cache.get(&1), Some(&"hello".to_string()));
//! assert!(create::<u64, String>(CachePolicy::Lfu, 0).is_err());
//! ```

use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use tracing::{debug, warn};

#[cfg(feature = "concurrency")]
use crate::concurrent::ThreadSafeCache;
use crate::error::ConfigError;
use crate::metrics::CacheMetricsSnapshot;
use crate::policy::fifo::FifoCache;
use crate::policy::lfu::LfuCache;
use crate::policy::lru::LruCache;
use crate::traits::CoreCache;

/// Available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CachePolicy {
    /// Least Recently Used eviction.
    #[default]
    Lru,
    /// Least Frequently Used eviction, ties broken by recency.
    Lfu,
    /// First In, First Out eviction.
    Fifo,
}

impl CachePolicy {
    pub const ALL: [CachePolicy; 3] = [CachePolicy::Lru, CachePolicy::Lfu, CachePolicy::Fifo];

    pub fn as_str(self) -> &'static str {
        match self {
            CachePolicy::Lru => "lru",
            CachePolicy::Lfu => "lfu",
            CachePolicy::Fifo => "fifo",
        }
    }
}

impl fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CachePolicy {
    type Err = ConfigError;

    /// Parses `"lru"`, `"lfu"` or `"fifo"`, ignoring ASCII case and
    /// surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        CachePolicy::ALL
            .into_iter()
            .find(|policy| policy.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ConfigError::new(format!("unknown cache policy: {trimmed:?}")))
    }
}

/// Policy-erased cache returned by the factory.
pub struct Cache<K, V> {
    inner: CacheInner<K, V>,
}

enum CacheInner<K, V> {
    Lru(LruCache<K, V>),
    Lfu(LfuCache<K, V>),
    Fifo(FifoCache<K, V>),
}

macro_rules! dispatch {
    ($inner:expr, $store:ident => $body:expr) => {
        match $inner {
            CacheInner::Lru($store) => $body,
            CacheInner::Lfu($store) => $body,
            CacheInner::Fifo($store) => $body,
        }
    };
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    /// The policy this cache was built with.
    pub fn policy(&self) -> CachePolicy {
        match self.inner {
            CacheInner::Lru(_) => CachePolicy::Lru,
            CacheInner::Lfu(_) => CachePolicy::Lfu,
            CacheInner::Fifo(_) => CachePolicy::Fifo,
        }
    }
}

impl<K, V> CoreCache<K, V> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn insert(&mut self, key: K, value: V) -> Option<V> {
        dispatch!(&mut self.inner, store => store.insert(key, value))
    }

    fn get(&mut self, key: &K) -> Option<&V> {
        dispatch!(&mut self.inner, store => store.get(key))
    }

    fn peek(&self, key: &K) -> Option<&V> {
        dispatch!(&self.inner, store => store.peek(key))
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        dispatch!(&mut self.inner, store => store.remove(key))
    }

    fn contains(&self, key: &K) -> bool {
        dispatch!(&self.inner, store => store.contains(key))
    }

    fn len(&self) -> usize {
        dispatch!(&self.inner, store => store.len())
    }

    fn capacity(&self) -> usize {
        dispatch!(&self.inner, store => store.capacity())
    }

    fn clear(&mut self) {
        dispatch!(&mut self.inner, store => store.clear())
    }

    fn metrics_snapshot(&self) -> CacheMetricsSnapshot {
        dispatch!(&self.inner, store => store.metrics_snapshot())
    }
}

impl<K, V> Extend<(K, V)> for Cache<K, V>
where
    K: Eq + Hash + Clone,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        dispatch!(&self.inner, store => f.debug_tuple("Cache").field(store).finish())
    }
}

/// Builds a cache for `policy` holding at most `capacity` entries.
///
/// # Errors
///
/// Returns [`ConfigError`] when `capacity` is zero.
pub fn create<K, V>(policy: CachePolicy, capacity: usize) -> Result<Cache<K, V>, ConfigError>
where
    K: Eq + Hash + Clone,
{
    let built = match policy {
        CachePolicy::Lru => LruCache::try_new(capacity).map(CacheInner::Lru),
        CachePolicy::Lfu => LfuCache::try_new(capacity).map(CacheInner::Lfu),
        CachePolicy::Fifo => FifoCache::try_new(capacity).map(CacheInner::Fifo),
    };
    match built {
        Ok(inner) => {
            debug!(%policy, capacity, "built cache");
            Ok(Cache { inner })
        },
        Err(err) => {
            warn!(%policy, capacity, error = %err, "rejected cache configuration");
            Err(err)
        },
    }
}

/// Thread-safe cache returned by [`create_thread_safe`].
#[cfg(feature = "concurrency")]
pub type SharedCache<K, V> = ThreadSafeCache<K, V, Cache<K, V>>;

/// Builds a cache like [`create`] and wraps it in a [`ThreadSafeCache`].
///
/// ```
/// use evictkit::builder::{create_thread_safe, CachePolicy};
///
/// let cache = create_thread_safe::<u32, u32>(CachePolicy::Fifo, 8).unwrap();
/// let worker = cache.clone();
/// std::thread::spawn(move || worker.insert(1, 10)).join().unwrap();
/// assert_eq!(cache.get(&1), Some(10));
/// ```
#[cfg(feature = "concurrency")]
pub fn create_thread_safe<K, V>(
    policy: CachePolicy,
    capacity: usize,
) -> Result<SharedCache<K, V>, ConfigError>
where
    K: Eq + Hash + Clone,
{
    create(policy, capacity).map(ThreadSafeCache::new)
}

/// Cache construction settings.
///
/// ```
/// use evictkit::builder::{CacheConfig, CachePolicy};
///
/// let config = CacheConfig::new()
///     .with_policy("lfu".parse().unwrap())
///     .with_capacity(64);
/// assert_eq!(config.policy, CachePolicy::Lfu);
/// assert!(!config.thread_safe);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    pub policy: CachePolicy,
    pub capacity: usize,
    /// Wrap the store in a [`ThreadSafeCache`](crate::concurrent::ThreadSafeCache).
    pub thread_safe: bool,
}

impl CacheConfig {
    pub const DEFAULT_CAPACITY: usize = 1000;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    pub fn with_thread_safe(mut self, thread_safe: bool) -> Self {
        self.thread_safe = thread_safe;
        self
    }

    /// Checks the settings without building anything.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::zero_capacity());
        }
        if self.thread_safe && !cfg!(feature = "concurrency") {
            return Err(ConfigError::new(
                "thread-safe caches require the `concurrency` feature",
            ));
        }
        Ok(())
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            policy: CachePolicy::Lru,
            capacity: Self::DEFAULT_CAPACITY,
            thread_safe: false,
        }
    }
}

/// Result of [`create_with_config`].
pub enum ConfiguredCache<K, V> {
    Plain(Cache<K, V>),
    #[cfg(feature = "concurrency")]
    ThreadSafe(SharedCache<K, V>),
}

impl<K, V> ConfiguredCache<K, V>
where
    K: Eq + Hash + Clone,
{
    pub fn is_thread_safe(&self) -> bool {
        !matches!(self, ConfiguredCache::Plain(_))
    }

    pub fn into_plain(self) -> Option<Cache<K, V>> {
        match self {
            ConfiguredCache::Plain(cache) => Some(cache),
            #[cfg(feature = "concurrency")]
            ConfiguredCache::ThreadSafe(_) => None,
        }
    }

    #[cfg(feature = "concurrency")]
    pub fn into_thread_safe(self) -> Option<SharedCache<K, V>> {
        match self {
            ConfiguredCache::ThreadSafe(cache) => Some(cache),
            ConfiguredCache::Plain(_) => None,
        }
    }

    pub fn policy(&self) -> CachePolicy {
        match self {
            ConfiguredCache::Plain(cache) => cache.policy(),
            #[cfg(feature = "concurrency")]
            ConfiguredCache::ThreadSafe(cache) => cache.with_read(|inner| inner.policy()),
        }
    }

    pub fn capacity(&self) -> usize {
        match self {
            ConfiguredCache::Plain(cache) => cache.capacity(),
            #[cfg(feature = "concurrency")]
            ConfiguredCache::ThreadSafe(cache) => cache.capacity(),
        }
    }
}

impl<K, V> fmt::Debug for ConfiguredCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfiguredCache::Plain(cache) => f.debug_tuple("Plain").field(cache).finish(),
            #[cfg(feature = "concurrency")]
            ConfiguredCache::ThreadSafe(cache) => f.debug_tuple("ThreadSafe").field(cache).finish(),
        }
    }
}

/// Builds a plain or thread-safe cache from `config`.
///
/// # Errors
///
/// Returns [`ConfigError`] when [`CacheConfig::validate`] fails.
pub fn create_with_config<K, V>(config: CacheConfig) -> Result<ConfiguredCache<K, V>, ConfigError>
where
    K: Eq + Hash + Clone,
{
    if let Err(err) = config.validate() {
        warn!(?config, error = %err, "rejected cache configuration");
        return Err(err);
    }
    let cache = create(config.policy, config.capacity)?;
    #[cfg(feature = "concurrency")]
    if config.thread_safe {
        return Ok(ConfiguredCache::ThreadSafe(ThreadSafeCache::new(cache)));
    }
    Ok(ConfiguredCache::Plain(cache))
}
