//! Bounded Cache Module
//!
//! Thread-safe handle over a [`CacheStore`] that owns the background sweep.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::cache::entry::estimate_size;
use crate::cache::{CacheStats, CacheStore, DebugInfo, SweepReport};
use crate::config::{CacheConfig, ConfigUpdate};
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

// == Bounded Cache ==
/// In-memory cache bounded by item count and estimated memory, with LRU
/// eviction, TTL expiry and a periodic background sweep.
///
/// All operations are synchronous. The entry map and the recency order are
/// guarded by one mutex, which is never held across an await point.
///
/// The sweep runs on the tokio runtime current at construction, including
/// restarts triggered from threads outside that runtime. Without one the
/// sweep is disabled: expired entries are then only dropped by reads,
/// by [`BoundedCache::sweep`], or by eviction.
///
/// After [`BoundedCache::destroy`] the cache stays empty: writes return
/// [`CacheError::Destroyed`] and reads behave as on an empty cache.
///
/// # Example
/// ```ignore
/// let cache: BoundedCache<serde_json::Value> = BoundedCache::new(CacheConfig::default());
/// cache.set("sa2_boundaries", geojson)?;
/// if let Some(data) = cache.get("sa2_boundaries") {
///     render(&data);
/// }
/// cache.destroy();
/// ```
pub struct BoundedCache<T> {
    store: Arc<Mutex<CacheStore<T>>>,
    /// Running sweep task and the interval it was started with
    cleanup: Mutex<Option<(Duration, JoinHandle<()>)>>,
    /// Runtime captured at construction; sweep tasks are spawned here
    runtime: Option<Handle>,
    /// Only written while `store` is locked
    destroyed: AtomicBool,
}

impl<T> BoundedCache<T>
where
    T: Serialize + Send + Sync + 'static,
{
    /// Creates a cache and starts its background sweep.
    pub fn new(config: CacheConfig) -> Self {
        let store = CacheStore::new(config);
        let interval = store.config().cleanup_interval;
        info!("Bounded cache initialized with config: {:?}", store.config());

        let runtime = Handle::try_current().ok();
        if runtime.is_none() {
            warn!("No tokio runtime available, background cache sweep disabled");
        }

        let cache = Self {
            store: Arc::new(Mutex::new(store)),
            cleanup: Mutex::new(None),
            runtime,
            destroyed: AtomicBool::new(false),
        };
        cache.start_cleanup(interval);
        cache
    }

    // == Set ==
    /// Stores `value` under `key`, evicting least recently used entries as
    /// needed to stay within both bounds.
    ///
    /// The size estimate is computed before the lock is taken.
    ///
    /// # Errors
    /// - [`CacheError::ValueTooLarge`] if the value alone exceeds the memory
    ///   budget. This is a soft failure; the cache is simply not populated.
    /// - [`CacheError::Destroyed`] after `destroy()`.
    pub fn set(&self, key: impl Into<String>, value: T) -> Result<()> {
        let key = key.into();
        let size_bytes = estimate_size(&value);

        let mut store = self.store.lock();
        if self.destroyed.load(Ordering::Acquire) {
            return Err(CacheError::Destroyed);
        }
        store.insert_sized(key, Arc::new(value), size_bytes)
    }

    /// Returns the live value under `key`, marking it most recently used.
    pub fn get(&self, key: &str) -> Option<Arc<T>> {
        self.store.lock().get(key)
    }

    /// Reports whether `key` holds a live entry, without touching recency or
    /// statistics.
    pub fn has(&self, key: &str) -> bool {
        self.store.lock().has(key)
    }

    /// Removes `key`. Returns whether anything was removed.
    pub fn delete(&self, key: &str) -> bool {
        self.store.lock().delete(key)
    }

    /// Removes every entry; lifetime hit/miss counters are kept.
    pub fn clear(&self) {
        self.store.lock().clear();
    }

    /// Runs one sweep immediately.
    pub fn sweep(&self) -> SweepReport {
        self.store.lock().sweep()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.lock().stats()
    }

    pub fn debug_info(&self) -> DebugInfo {
        self.store.lock().debug_info()
    }

    pub fn config(&self) -> CacheConfig {
        self.store.lock().config().clone()
    }

    pub fn len(&self) -> usize {
        self.store.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.lock().is_empty()
    }

    // == Update Config ==
    /// Merges `update` into the configuration.
    ///
    /// Tightened bounds are enforced immediately. A changed sweep interval
    /// replaces the running sweep task. The replacement happens under the
    /// store lock, so concurrent updates leave the task running at the
    /// interval `config()` reports.
    ///
    /// # Errors
    /// [`CacheError::Destroyed`] after `destroy()`.
    pub fn update_config(&self, update: ConfigUpdate) -> Result<()> {
        let mut store = self.store.lock();
        if self.destroyed.load(Ordering::Acquire) {
            return Err(CacheError::Destroyed);
        }

        let previous_interval = store.update_config(&update).cleanup_interval;
        let interval = store.config().cleanup_interval;
        if interval != previous_interval {
            info!(
                "Sweep interval changed from {:?} to {:?}, restarting sweep task",
                previous_interval, interval
            );
            self.start_cleanup(interval);
        }
        Ok(())
    }

    // == Destroy ==
    /// Stops the background sweep and releases every entry.
    ///
    /// Idempotent. Lifetime counters survive for `stats()`.
    pub fn destroy(&self) {
        {
            let mut store = self.store.lock();
            if !self.destroyed.swap(true, Ordering::AcqRel) {
                let stats = store.stats();
                info!(
                    "Bounded cache destroying: {} items, {} bytes freed, hit rate {}%",
                    stats.total_entries, stats.total_memory_bytes, stats.hit_rate
                );
            }
            store.clear();
        }

        if let Some((_, handle)) = self.cleanup.lock().take() {
            handle.abort();
        }
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::Acquire)
    }

    /// Whether a background sweep task is currently scheduled.
    pub fn is_sweeping(&self) -> bool {
        self.cleanup
            .lock()
            .as_ref()
            .map_or(false, |(_, handle)| !handle.is_finished())
    }

    /// Period of the scheduled sweep task, if any.
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.cleanup
            .lock()
            .as_ref()
            .filter(|(_, handle)| !handle.is_finished())
            .map(|(interval, _)| *interval)
    }

    /// Replaces the sweep task with one running every `interval`.
    ///
    /// The previous task is aborted first, so two sweeps never run side by
    /// side. Lock order is `store` then `cleanup`.
    fn start_cleanup(&self, interval: Duration) {
        let mut slot = self.cleanup.lock();
        if let Some((_, previous)) = slot.take() {
            previous.abort();
        }

        if self.destroyed.load(Ordering::Acquire) {
            return;
        }

        if let Some(runtime) = &self.runtime {
            *slot = Some((interval, spawn_cleanup_task(runtime, &self.store, interval)));
        }
    }
}

impl<T> Default for BoundedCache<T>
where
    T: Serialize + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl<T> Drop for BoundedCache<T> {
    fn drop(&mut self) {
        if let Some((_, handle)) = self.cleanup.get_mut().take() {
            handle.abort();
        }
    }
}
