//! Cache Statistics Module
//!
//! Lifetime counters kept by the store, and the snapshot reported to callers.

use chrono::{DateTime, Utc};
use serde::Serialize;

// == Cache Counters ==
/// Lifetime counters. `clear()` leaves them untouched.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    /// Number of successful reads
    pub hits: u64,
    /// Number of failed reads (absent or expired)
    pub misses: u64,
    /// Number of entries evicted to restore the bounds
    pub evictions: u64,
    /// Number of sweeps that removed at least one expired entry
    pub sweeps: u64,
}

impl CacheCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_sweep(&mut self) {
        self.sweeps += 1;
    }

    // == Rates ==
    /// Hit and miss rates as percentages of all reads.
    ///
    /// Both are 0.0 before the first read.
    pub fn rates(&self) -> (f64, f64) {
        let total = self.hits + self.misses;
        if total == 0 {
            (0.0, 0.0)
        } else {
            (
                percent(self.hits as f64, total as f64),
                percent(self.misses as f64, total as f64),
            )
        }
    }
}

// == Cache Stats ==
/// Point-in-time view of the cache, derived from its entries and counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CacheStats {
    /// Current number of entries
    pub total_entries: usize,
    /// Sum of the estimated sizes of current entries
    pub total_memory_bytes: usize,
    /// Lifetime successful reads
    pub total_hits: u64,
    /// Lifetime failed reads
    pub total_misses: u64,
    /// Hits as a percentage of reads
    pub hit_rate: f64,
    /// Misses as a percentage of reads
    pub miss_rate: f64,
    /// Lifetime LRU evictions
    pub evictions: u64,
    /// Lifetime sweeps that expired something
    pub sweeps: u64,
    /// Insertion time of the oldest current entry
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Insertion time of the newest current entry
    pub newest_entry: Option<DateTime<Utc>>,
    /// Mean read count across current entries
    pub average_access_count: f64,
    /// `total_memory_bytes` as a percentage of the memory budget
    pub memory_utilization_percent: f64,
}

/// `part / whole * 100`, rounded to two decimals.
pub(crate) fn percent(part: f64, whole: f64) -> f64 {
    if whole <= 0.0 {
        return 0.0;
    }
    round2(part / whole * 100.0)
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
