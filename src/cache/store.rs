//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with recency tracking, TTL
//! expiration and a memory budget. The store is not synchronized; see
//! `BoundedCache` for the shared, self-sweeping handle.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::entry::estimate_size;
use crate::cache::stats::{percent, round2};
use crate::cache::{
    CacheCounters, CacheEntry, CacheStats, DebugInfo, EntrySummary, RecencyOrder,
};
use crate::config::{CacheConfig, ConfigUpdate};
use crate::error::{CacheError, Result};

/// Outcome of one background sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed because their TTL elapsed
    pub expired: usize,
    /// Entries evicted to get back under the memory budget
    pub evicted: usize,
}

impl SweepReport {
    pub fn removed(&self) -> usize {
        self.expired + self.evicted
    }
}

// == Cache Store ==
/// Bounded key-value storage with LRU eviction and TTL expiry.
///
/// Invariant: `entries` and `recency` always hold the same key set, and
/// `memory_bytes` is the sum of the entries' `size_bytes`.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// LRU access order
    recency: RecencyOrder,
    /// Lifetime statistics
    counters: CacheCounters,
    /// Bounds and timings
    config: CacheConfig,
    /// Running total of estimated entry sizes
    memory_bytes: usize,
}

impl<T> CacheStore<T> {
    // == Constructor ==
    /// Creates an empty store. Out-of-range config values are clamped.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            recency: RecencyOrder::new(),
            counters: CacheCounters::new(),
            config: config.clamped(),
            memory_bytes: 0,
        }
    }

    // == Set ==
    /// Stores a value whose size has already been estimated.
    ///
    /// An existing entry under `key` is replaced as a fresh insert: new
    /// value, size and timestamps, moved to the most recently used position.
    /// Afterwards least recently used entries are evicted until both bounds
    /// hold again.
    ///
    /// # Errors
    /// [`CacheError::ValueTooLarge`] if `size_bytes` alone exceeds the memory
    /// budget. Nothing is stored and an existing entry is left untouched.
    pub fn insert_sized(&mut self, key: String, value: Arc<T>, size_bytes: usize) -> Result<()> {
        let limit_bytes = self.config.max_memory_bytes;
        if size_bytes > limit_bytes {
            warn!(
                "Item {} ({} bytes) exceeds memory limit ({} bytes), not caching",
                key, size_bytes, limit_bytes
            );
            return Err(CacheError::ValueTooLarge {
                key,
                size_bytes,
                limit_bytes,
            });
        }

        self.remove_entry(&key);

        self.memory_bytes += size_bytes;
        self.recency.touch(&key);
        self.entries.insert(key, CacheEntry::new(value, size_bytes));

        self.enforce_bounds();

        debug!(
            "Cached entry ({} bytes). Total: {} items, {} bytes",
            size_bytes,
            self.entries.len(),
            self.memory_bytes
        );
        Ok(())
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// A hit bumps the entry to most recently used and updates its access
    /// bookkeeping. An expired entry is removed and counted as a miss.
    pub fn get(&mut self, key: &str) -> Option<Arc<T>> {
        let ttl = self.config.ttl;

        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(ttl),
            None => {
                self.counters.record_miss();
                debug!("Cache miss: {}", key);
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            debug!("Cache entry expired: {}", key);
            return None;
        }

        let entry = self.entries.get_mut(key)?;
        entry.record_access();
        let value = Arc::clone(&entry.value);
        let access_count = entry.access_count;

        self.recency.touch(key);
        self.counters.record_hit();
        debug!("Cache hit: {} (accessed {} times)", key, access_count);

        Some(value)
    }

    // == Has ==
    /// Reports whether `key` holds a live entry.
    ///
    /// Pure probe: recency, access counts and statistics are untouched, and
    /// an expired entry is left for `get` or the sweep to remove.
    pub fn has(&self, key: &str) -> bool {
        self.entries
            .get(key)
            .map_or(false, |entry| !entry.is_expired(self.config.ttl))
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            debug!("Deleted cache entry: {}", key);
        }
        removed
    }

    // == Clear ==
    /// Removes every entry. Lifetime counters are kept.
    pub fn clear(&mut self) {
        let count = self.entries.len();
        let freed = self.memory_bytes;

        self.entries.clear();
        self.recency.clear();
        self.memory_bytes = 0;

        if count > 0 {
            info!("Cache cleared: {} items, {} bytes freed", count, freed);
        }
    }

    // == Sweep ==
    /// Removes expired entries, then evicts until the memory budget holds.
    pub fn sweep(&mut self) -> SweepReport {
        let ttl = self.config.ttl;
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired(ttl))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            if let Some(entry) = self.remove_entry(key) {
                debug!("Expired: {} (age: {}s)", key, entry.age().as_secs());
            }
        }

        if !expired_keys.is_empty() {
            self.counters.record_sweep();
        }

        let evicted = if self.memory_bytes > self.config.max_memory_bytes {
            info!(
                "Memory limit exceeded ({} / {} bytes), evicting LRU items",
                self.memory_bytes, self.config.max_memory_bytes
            );
            self.enforce_bounds()
        } else {
            0
        };

        SweepReport {
            expired: expired_keys.len(),
            evicted,
        }
    }

    // == Update Config ==
    /// Merges `update` into the configuration and re-establishes the bounds.
    ///
    /// Returns the previous configuration.
    pub fn update_config(&mut self, update: &ConfigUpdate) -> CacheConfig {
        let merged = self.config.merge(update);
        let previous = std::mem::replace(&mut self.config, merged);
        info!("Cache config updated: {:?} -> {:?}", previous, self.config);

        let evicted = self.enforce_bounds();
        if evicted > 0 {
            info!("New config required immediate eviction of {} entries", evicted);
        }
        previous
    }

    // == Enforce Bounds ==
    /// Evicts least recently used entries while either bound is exceeded.
    ///
    /// Stops when the recency order runs dry, whatever the bounds say.
    /// Returns the number of entries evicted.
    pub fn enforce_bounds(&mut self) -> usize {
        let mut evicted = 0;

        while self.entries.len() > self.config.max_items
            || self.memory_bytes > self.config.max_memory_bytes
        {
            let Some(key) = self.recency.pop_least_recent() else {
                break;
            };

            if let Some(entry) = self.entries.remove(&key) {
                self.memory_bytes -= entry.size_bytes;
                self.counters.record_eviction();
                evicted += 1;
                info!(
                    "LRU evicting: {} ({} bytes, accessed {} times)",
                    key, entry.size_bytes, entry.access_count
                );
            }
        }

        evicted
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let (hit_rate, miss_rate) = self.counters.rates();
        let total_accesses: u64 = self.entries.values().map(|e| e.access_count).sum();
        let average_access_count = if self.entries.is_empty() {
            0.0
        } else {
            round2(total_accesses as f64 / self.entries.len() as f64)
        };

        CacheStats {
            total_entries: self.entries.len(),
            total_memory_bytes: self.memory_bytes,
            total_hits: self.counters.hits,
            total_misses: self.counters.misses,
            hit_rate,
            miss_rate,
            evictions: self.counters.evictions,
            sweeps: self.counters.sweeps,
            oldest_entry: self.entries.values().map(|e| e.created_at).min(),
            newest_entry: self.entries.values().map(|e| e.created_at).max(),
            average_access_count,
            memory_utilization_percent: percent(
                self.memory_bytes as f64,
                self.config.max_memory_bytes as f64,
            ),
        }
    }

    // == Debug Info ==
    /// Returns configuration, statistics and a per-entry breakdown.
    pub fn debug_info(&self) -> DebugInfo {
        let now = Utc::now();
        let mut entries: Vec<EntrySummary> = self
            .entries
            .iter()
            .map(|(key, entry)| EntrySummary {
                key: key.clone(),
                size_bytes: entry.size_bytes,
                access_count: entry.access_count,
                age_secs: entry.age().as_secs(),
                idle_secs: (now - entry.last_accessed_at).num_seconds().max(0) as u64,
            })
            .collect();
        entries.sort_by(|a, b| b.access_count.cmp(&a.access_count).then_with(|| a.key.cmp(&b.key)));

        DebugInfo {
            config: self.config.clone(),
            stats: self.stats(),
            entries,
            recency_order: self.keys_by_recency(),
        }
    }

    /// Keys from least to most recently used.
    pub fn keys_by_recency(&self) -> Vec<String> {
        self.recency.iter().map(str::to_string).collect()
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Sum of the estimated sizes of all entries.
    pub fn memory_bytes(&self) -> usize {
        self.memory_bytes
    }

    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes `key` from the map and the recency order together.
    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.recency.remove(key);
        self.memory_bytes -= entry.size_bytes;
        Some(entry)
    }
}

impl<T: Serialize> CacheStore<T> {
    /// Stores a value, estimating its size from its serialized form.
    ///
    /// See [`CacheStore::insert_sized`] for replacement and eviction rules.
    pub fn set(&mut self, key: impl Into<String>, value: T) -> Result<()> {
        let size_bytes = estimate_size(&value);
        self.insert_sized(key.into(), Arc::new(value), size_bytes)
    }
}

impl<T> Default for CacheStore<T> {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}
