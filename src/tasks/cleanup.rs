//! Cache Sweep Task
//!
//! Background task that periodically removes expired entries and enforces
//! the memory budget.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically sweeps the cache store.
///
/// The task sleeps for `interval` between sweeps and locks the store only
/// for the duration of one sweep. It holds a weak reference, so it ends on
/// its own once the store has been dropped.
///
/// # Arguments
/// * `runtime` - Runtime to spawn the task on
/// * `store` - Shared reference to the cache store
/// * `interval` - Time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task, used to abort it on teardown or when
/// the interval changes.
///
/// # Example
/// ```ignore
/// let store = Arc::new(Mutex::new(CacheStore::<String>::default()));
/// let handle = spawn_cleanup_task(&Handle::current(), &store, Duration::from_secs(300));
/// // Later, during teardown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task<T>(
    runtime: &Handle,
    store: &Arc<Mutex<CacheStore<T>>>,
    interval: Duration,
) -> JoinHandle<()>
where
    T: Send + Sync + 'static,
{
    let store: Weak<Mutex<CacheStore<T>>> = Arc::downgrade(store);

    runtime.spawn(async move {
        info!("Starting cache sweep task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let Some(store) = store.upgrade() else {
                debug!("Cache store dropped, stopping sweep task");
                break;
            };

            let report = store.lock().sweep();

            if report.removed() > 0 {
                info!(
                    "Cache sweep: removed {} expired and evicted {} entries",
                    report.expired, report.evicted
                );
            } else {
                debug!("Cache sweep: nothing to remove");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn shared_store(ttl: Duration) -> Arc<Mutex<CacheStore<String>>> {
        Arc::new(Mutex::new(CacheStore::new(CacheConfig {
            ttl,
            ..CacheConfig::default()
        })))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = shared_store(Duration::from_millis(30));
        store
            .lock()
            .set("expire_soon", "value".to_string())
            .unwrap();

        let handle = spawn_cleanup_task(&Handle::current(), &store, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Checked through `len` so the read itself cannot expire the entry
        assert_eq!(store.lock().len(), 0, "Expired entry should have been swept");
        assert_eq!(store.lock().stats().sweeps, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let store = shared_store(Duration::from_secs(3600));
        store
            .lock()
            .set("long_lived", "value".to_string())
            .unwrap();

        let handle = spawn_cleanup_task(&Handle::current(), &store, Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;

        let value = store.lock().get("long_lived");
        assert_eq!(value.as_deref().map(String::as_str), Some("value"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = shared_store(Duration::from_secs(60));

        let handle = spawn_cleanup_task(&Handle::current(), &store, Duration::from_millis(20));
        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }

    #[tokio::test]
    async fn test_cleanup_task_stops_when_store_dropped() {
        let store = shared_store(Duration::from_secs(60));

        let handle = spawn_cleanup_task(&Handle::current(), &store, Duration::from_millis(10));
        drop(store);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should end once the store is gone");
    }
}
