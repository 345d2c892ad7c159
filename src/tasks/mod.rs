//! Background Tasks Module
//!
//! Contains background tasks that run periodically for the lifetime of a
//! cache.
//!
//! # Tasks
//! - Cache Sweep: Removes expired entries and enforces the memory budget at
//!   the configured interval

mod cleanup;

pub use cleanup::spawn_cleanup_task;
