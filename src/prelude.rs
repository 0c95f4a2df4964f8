pub use crate::builder::{Cache, CacheConfig, CachePolicy, ConfiguredCache, create, create_with_config};
#[cfg(feature = "concurrency")]
pub use crate::builder::{SharedCache, create_thread_safe};
#[cfg(feature = "concurrency")]
pub use crate::concurrent::ThreadSafeCache;
pub use crate::ds::{IntrusiveList, SlotArena, SlotId};
pub use crate::error::{ConfigError, InvariantError};
pub use crate::metrics::CacheMetricsSnapshot;
pub use crate::policy::fifo::FifoCache;
pub use crate::policy::lfu::LfuCache;
pub use crate::policy::lru::LruCache;
pub use crate::traits::{
    ConcurrentCache, CoreCache, FifoCacheTrait, LfuCacheTrait, LruCacheTrait,
};
