/// Point-in-time copy of a store's counters and gauges.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheMetricsSnapshot {
    pub get_hits: u64,
    pub get_misses: u64,

    pub insert_new: u64,
    pub insert_updates: u64,

    pub evicted_entries: u64,
    pub removals: u64,

    // gauges captured at snapshot time
    pub cache_len: usize,
    pub capacity: usize,
}

impl CacheMetricsSnapshot {
    /// Number of `get` calls since construction or the last `clear()`.
    pub fn total_gets(&self) -> u64 {
        self.get_hits + self.get_misses
    }

    /// `hits / (hits + misses)`, or `0.0` before any lookup.
    pub fn hit_rate(&self) -> f64 {
        match self.total_gets() {
            0 => 0.0,
            total => self.get_hits as f64 / total as f64,
        }
    }
}
