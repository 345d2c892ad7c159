//! Configuration Module
//!
//! Cache bounds and timings, loadable from environment variables, plus the
//! partial update applied at runtime by `BoundedCache::update_config`.

use std::env;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Default maximum number of entries
pub const DEFAULT_MAX_ITEMS: usize = 10;

/// Default memory budget (512 MiB)
pub const DEFAULT_MAX_MEMORY_BYTES: usize = 512 * 1024 * 1024;

/// Default entry lifetime, measured from insertion
pub const DEFAULT_TTL: Duration = Duration::from_secs(30 * 60);

/// Default period of the background sweep
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(5 * 60);

/// Shortest sweep period accepted; smaller values are raised to this.
pub const MIN_CLEANUP_INTERVAL: Duration = Duration::from_millis(10);

/// Cache configuration parameters.
///
/// Values can be loaded from environment variables with sensible defaults.
/// Every constructor path goes through [`CacheConfig::clamped`], so a config
/// held by the cache always has `max_items >= 1`, `max_memory_bytes >= 1`
/// and a sweep period of at least [`MIN_CLEANUP_INTERVAL`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of entries the cache can hold
    pub max_items: usize,
    /// Maximum cumulative estimated size of all entries
    pub max_memory_bytes: usize,
    /// Age after which an entry is expired
    pub ttl: Duration,
    /// Period of the background sweep
    pub cleanup_interval: Duration,
}

impl CacheConfig {
    /// Creates a new CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ITEMS` - Maximum cache entries (default: 10)
    /// - `CACHE_MAX_MEMORY_MB` - Memory budget in MiB (default: 512)
    /// - `CACHE_TTL_SECS` - Entry lifetime in seconds (default: 1800)
    /// - `CACHE_CLEANUP_INTERVAL_SECS` - Sweep period in seconds (default: 300)
    pub fn from_env() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a config from an arbitrary variable source.
    ///
    /// Missing or unparsable values fall back to the defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let parse = |name: &str| lookup(name).and_then(|v| v.trim().parse::<u64>().ok());
        let defaults = Self::default();

        Self {
            max_items: parse("CACHE_MAX_ITEMS")
                .and_then(|v| usize::try_from(v).ok())
                .unwrap_or(defaults.max_items),
            max_memory_bytes: parse("CACHE_MAX_MEMORY_MB")
                .and_then(|mb| usize::try_from(mb).ok())
                .map(|mb| mb.saturating_mul(1024 * 1024))
                .unwrap_or(defaults.max_memory_bytes),
            ttl: parse("CACHE_TTL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.ttl),
            cleanup_interval: parse("CACHE_CLEANUP_INTERVAL_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.cleanup_interval),
        }
        .clamped()
    }

    /// Returns a copy with out-of-range values raised to their minimums.
    pub fn clamped(mut self) -> Self {
        self.max_items = self.max_items.max(1);
        self.max_memory_bytes = self.max_memory_bytes.max(1);
        self.cleanup_interval = self.cleanup_interval.max(MIN_CLEANUP_INTERVAL);
        self
    }

    // == Merge ==
    /// Applies the fields set in `update`, leaving the others untouched.
    pub fn merge(&self, update: &ConfigUpdate) -> Self {
        Self {
            max_items: update.max_items.unwrap_or(self.max_items),
            max_memory_bytes: update.max_memory_bytes.unwrap_or(self.max_memory_bytes),
            ttl: update.ttl.unwrap_or(self.ttl),
            cleanup_interval: update.cleanup_interval.unwrap_or(self.cleanup_interval),
        }
        .clamped()
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_items: DEFAULT_MAX_ITEMS,
            max_memory_bytes: DEFAULT_MAX_MEMORY_BYTES,
            ttl: DEFAULT_TTL,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

/// Partial configuration applied by `update_config`.
///
/// Unset fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigUpdate {
    pub max_items: Option<usize>,
    pub max_memory_bytes: Option<usize>,
    pub ttl: Option<Duration>,
    pub cleanup_interval: Option<Duration>,
}

impl ConfigUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_items(mut self, max_items: usize) -> Self {
        self.max_items = Some(max_items);
        self
    }

    pub fn max_memory_bytes(mut self, max_memory_bytes: usize) -> Self {
        self.max_memory_bytes = Some(max_memory_bytes);
        self
    }

    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn cleanup_interval(mut self, cleanup_interval: Duration) -> Self {
        self.cleanup_interval = Some(cleanup_interval);
        self
    }
}
