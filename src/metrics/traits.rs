//! # Metrics Traits
//!
//! ```text
//!   store ──record_*()──► CoreMetricsRecorder (CacheMetrics)
//!                                  │
//!                                  ▼ metrics_snapshot()
//!   caller ◄────────── CacheMetricsSnapshot (Copy)
//! ```
//!
//! Counters are only touched from inside a store method, so under a
//! [`ThreadSafeCache`](crate::concurrent::ThreadSafeCache) they are always
//! updated in the same critical section as the structural change they
//! describe.

/// Counters every cache policy records.
pub trait CoreMetricsRecorder {
    fn record_get_hit(&mut self);
    fn record_get_miss(&mut self);
    fn record_insert_new(&mut self);
    fn record_insert_update(&mut self);
    fn record_evicted_entry(&mut self);
    fn record_removal(&mut self);
    /// Resets every counter; called by `clear()`.
    fn record_clear(&mut self);
}
