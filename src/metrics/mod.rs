//! Hit/miss and eviction accounting shared by every policy.
//!
//! Stores write counters through [`CoreMetricsRecorder`]; callers only ever
//! see an immutable [`CacheMetricsSnapshot`] from
//! [`CoreCache::metrics_snapshot`](crate::traits::CoreCache::metrics_snapshot).

pub mod metrics_impl;
pub mod snapshot;
pub mod traits;

pub use metrics_impl::CacheMetrics;
pub use snapshot::CacheMetricsSnapshot;
pub use traits::CoreMetricsRecorder;
