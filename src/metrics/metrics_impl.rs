use crate::metrics::snapshot::CacheMetricsSnapshot;
use crate::metrics::traits::CoreMetricsRecorder;

#[derive(Debug, Default, Clone)]
pub struct CacheMetrics {
    pub get_hits: u64,
    pub get_misses: u64,
    pub insert_new: u64,
    pub insert_updates: u64,
    pub evicted_entries: u64,
    pub removals: u64,
}

impl CacheMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Captures the counters together with the store's current gauges.
    pub fn snapshot_with(&self, len: usize, capacity: usize) -> CacheMetricsSnapshot {
        CacheMetricsSnapshot {
            get_hits: self.get_hits,
            get_misses: self.get_misses,
            insert_new: self.insert_new,
            insert_updates: self.insert_updates,
            evicted_entries: self.evicted_entries,
            removals: self.removals,
            cache_len: len,
            capacity,
        }
    }
}

impl CoreMetricsRecorder for CacheMetrics {
    #[inline]
    fn record_get_hit(&mut self) {
        self.get_hits += 1;
    }

    #[inline]
    fn record_get_miss(&mut self) {
        self.get_misses += 1;
    }

    #[inline]
    fn record_insert_new(&mut self) {
        self.insert_new += 1;
    }

    #[inline]
    fn record_insert_update(&mut self) {
        self.insert_updates += 1;
    }

    #[inline]
    fn record_evicted_entry(&mut self) {
        self.evicted_entries += 1;
    }

    #[inline]
    fn record_removal(&mut self) {
        self.removals += 1;
    }

    fn record_clear(&mut self) {
        *self = Self::default();
    }
}
