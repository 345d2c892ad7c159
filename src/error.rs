//! Error types for the bounded cache
//!
//! Provides unified error handling using thiserror. Cache misses are never
//! errors; only rejected writes surface here.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the bounded cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// A single value is larger than the whole memory budget
    #[error("Value for key '{key}' ({size_bytes} bytes) exceeds memory limit of {limit_bytes} bytes")]
    ValueTooLarge {
        key: String,
        size_bytes: usize,
        limit_bytes: usize,
    },

    /// The cache was torn down with `destroy()`
    #[error("Cache has been destroyed")]
    Destroyed,
}

// == Result Type Alias ==
/// Convenience Result type for the bounded cache.
pub type Result<T> = std::result::Result<T, CacheError>;
