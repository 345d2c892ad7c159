//! Cache Module
//!
//! Provides in-memory caching bounded by entry count and estimated memory,
//! with LRU eviction and TTL expiration.

mod bounded;
mod debug;
mod entry;
mod lru;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use bounded::BoundedCache;
pub use debug::{DebugInfo, EntrySummary};
pub use entry::{estimate_size, CacheEntry};
pub use lru::RecencyOrder;
pub use stats::{CacheCounters, CacheStats};
pub use store::{CacheStore, SweepReport};

// == Public Constants ==
/// Bookkeeping cost added to every entry's estimated size
pub const ENTRY_OVERHEAD_BYTES: usize = 1024;

/// Size charged to a value whose serialization fails (10 MiB)
pub const FALLBACK_SIZE_BYTES: usize = 10 * 1024 * 1024;
