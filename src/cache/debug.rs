//! Debug Snapshot Module
//!
//! Detailed, serializable dump of the cache for diagnostics.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::config::CacheConfig;

/// Full view of configuration, statistics and entries.
#[derive(Debug, Clone, Serialize)]
pub struct DebugInfo {
    pub config: CacheConfig,
    pub stats: CacheStats,
    /// Entries, most accessed first
    pub entries: Vec<EntrySummary>,
    /// Keys, least recently used first
    pub recency_order: Vec<String>,
}

/// Per-entry line of a [`DebugInfo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntrySummary {
    pub key: String,
    pub size_bytes: usize,
    pub access_count: u64,
    /// Seconds since insertion
    pub age_secs: u64,
    /// Seconds since the last read (or insertion if never read)
    pub idle_secs: u64,
}
