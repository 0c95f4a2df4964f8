//! evictkit: in-process key/value caches with pluggable eviction.
//!
//! Three stores share the [`traits::CoreCache`] contract:
//! [`policy::lru::LruCache`], [`policy::lfu::LfuCache`] and
//! [`policy::fifo::FifoCache`]. [`builder::create`] picks one by
//! [`builder::CachePolicy`]; [`concurrent::ThreadSafeCache`] shares any of
//! them between threads.
//!
//! ```
//! use evictkit::prelude::*;
//!
//! let mut cache = create::<&str, u32>(CachePolicy::Lfu, 2).unwrap();
//! cache.insert("a", 1);
//! cache.insert("b", 2);
//! cache.get(&"a");
//! cache.insert("c", 3);
//! assert!(!cache.contains(&"b"));
//! ```

pub mod builder;
#[cfg(feature = "concurrency")]
pub mod concurrent;
pub mod ds;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod prelude;
pub mod traits;
