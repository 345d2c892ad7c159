//! Cache Entry Module
//!
//! Defines the structure for individual cache entries and how their size is
//! estimated.

use std::io;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::warn;

use crate::cache::{ENTRY_OVERHEAD_BYTES, FALLBACK_SIZE_BYTES};

// == Cache Entry ==
/// Represents a single cache entry with value and metadata.
#[derive(Debug)]
pub struct CacheEntry<T> {
    /// The stored value, shared with callers
    pub value: Arc<T>,
    /// Monotonic insertion instant, drives TTL expiry
    pub created: Instant,
    /// Wall-clock insertion time, for reporting
    pub created_at: DateTime<Utc>,
    /// Wall-clock time of the last successful read
    pub last_accessed_at: DateTime<Utc>,
    /// Number of successful reads
    pub access_count: u64,
    /// Estimated footprint, fixed at insertion
    pub size_bytes: usize,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current time.
    ///
    /// # Arguments
    /// * `value` - The value to store
    /// * `size_bytes` - Estimated footprint of the value, overhead included
    pub fn new(value: Arc<T>, size_bytes: usize) -> Self {
        let now = Utc::now();

        Self {
            value,
            created: Instant::now(),
            created_at: now,
            last_accessed_at: now,
            access_count: 0,
            size_bytes,
        }
    }

    // == Is Expired ==
    /// Checks if the entry is older than `ttl`.
    ///
    /// Expiry is absolute: reads do not extend it. An entry whose age equals
    /// `ttl` exactly is still live.
    pub fn is_expired(&self, ttl: Duration) -> bool {
        self.is_expired_at(ttl, Instant::now())
    }

    /// Checks expiry as of `now`.
    pub fn is_expired_at(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.created) > ttl
    }

    /// Time elapsed since insertion.
    pub fn age(&self) -> Duration {
        self.created.elapsed()
    }

    // == Record Access ==
    /// Updates read bookkeeping after a hit.
    pub fn record_access(&mut self) {
        self.access_count += 1;
        self.last_accessed_at = Utc::now();
    }
}

// == Size Estimation ==
/// Estimates the footprint of `value` from its JSON encoding.
///
/// Adds [`ENTRY_OVERHEAD_BYTES`] for bookkeeping. Values that fail to
/// serialize are charged [`FALLBACK_SIZE_BYTES`] so they are never free.
pub fn estimate_size<T: Serialize + ?Sized>(value: &T) -> usize {
    let mut counter = ByteCounter::default();
    match serde_json::to_writer(&mut counter, value) {
        Ok(()) => counter.0.saturating_add(ENTRY_OVERHEAD_BYTES),
        Err(e) => {
            warn!(
                "Could not estimate cache entry size, using {} bytes: {}",
                FALLBACK_SIZE_BYTES, e
            );
            FALLBACK_SIZE_BYTES
        }
    }
}

/// Sink that only counts the bytes written to it.
#[derive(Default)]
struct ByteCounter(usize);

impl io::Write for ByteCounter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0 = self.0.saturating_add(buf.len());
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
