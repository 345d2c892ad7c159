//! Bounded Cache - An in-memory cache for large, parsed datasets
//!
//! Bounded by both entry count and estimated memory, with LRU eviction,
//! absolute TTL expiry and a periodic background sweep.

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{BoundedCache, CacheStats, CacheStore, DebugInfo, SweepReport};
pub use config::{CacheConfig, ConfigUpdate};
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
