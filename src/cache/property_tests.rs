//! Property-Based Tests for Cache Module
//!
//! Uses proptest to check the store's invariants over arbitrary operation
//! sequences.

use proptest::prelude::*;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use crate::cache::{CacheStore, ENTRY_OVERHEAD_BYTES};
use crate::config::{CacheConfig, ConfigUpdate};

// == Test Configuration ==
const TEST_MAX_ITEMS: usize = 20;
const TEST_MAX_MEMORY: usize = 16 * 1024;

fn test_store(max_items: usize, max_memory_bytes: usize) -> CacheStore<String> {
    CacheStore::new(CacheConfig {
        max_items,
        max_memory_bytes,
        ttl: Duration::from_secs(300),
        ..CacheConfig::default()
    })
}

/// Checks that map, recency order and memory total agree.
fn check_consistent(store: &CacheStore<String>) -> Result<(), TestCaseError> {
    let order = store.keys_by_recency();
    let unique: HashSet<&String> = order.iter().collect();
    prop_assert_eq!(unique.len(), order.len(), "Duplicate key in recency order");
    prop_assert_eq!(order.len(), store.len(), "Recency order and map disagree");

    let info = store.debug_info();
    let listed: HashSet<&String> = info.entries.iter().map(|e| &e.key).collect();
    prop_assert_eq!(listed, unique, "Recency order and map hold different keys");

    let total: usize = info.entries.iter().map(|e| e.size_bytes).sum();
    prop_assert_eq!(total, store.memory_bytes(), "Memory total drifted");
    Ok(())
}

// == Strategies ==
/// Generates cache keys from a small alphabet so operations collide
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-h]{1,2}".prop_map(|s| s)
}

/// Generates values of widely varying size
fn value_strategy() -> impl Strategy<Value = String> {
    (0usize..6000).prop_map(|len| "v".repeat(len))
}

#[derive(Debug, Clone)]
enum CacheOp {
    Set { key: String, value: String },
    Get { key: String },
    Has { key: String },
    Delete { key: String },
    Clear,
    Shrink { max_items: usize },
}

fn cache_op_strategy() -> impl Strategy<Value = CacheOp> {
    prop_oneof![
        6 => (key_strategy(), value_strategy())
            .prop_map(|(key, value)| CacheOp::Set { key, value }),
        4 => key_strategy().prop_map(|key| CacheOp::Get { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Has { key }),
        2 => key_strategy().prop_map(|key| CacheOp::Delete { key }),
        1 => Just(CacheOp::Clear),
        1 => (1usize..TEST_MAX_ITEMS).prop_map(|max_items| CacheOp::Shrink { max_items }),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    // After every operation both bounds hold and the map, recency order and
    // memory total stay in agreement.
    #[test]
    fn prop_bounds_and_consistency(ops in prop::collection::vec(cache_op_strategy(), 1..80)) {
        let mut store = test_store(TEST_MAX_ITEMS, TEST_MAX_MEMORY);

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value);
                }
                CacheOp::Get { key } => {
                    let _ = store.get(&key);
                }
                CacheOp::Has { key } => {
                    let _ = store.has(&key);
                }
                CacheOp::Delete { key } => {
                    let _ = store.delete(&key);
                }
                CacheOp::Clear => store.clear(),
                CacheOp::Shrink { max_items } => {
                    store.update_config(&ConfigUpdate::new().max_items(max_items));
                }
            }

            prop_assert!(store.len() <= store.config().max_items);
            prop_assert!(store.memory_bytes() <= store.config().max_memory_bytes);
            check_consistent(&store)?;
        }
    }

    // Hit and miss counters match the outcomes observed by the caller.
    #[test]
    fn prop_statistics_accuracy(ops in prop::collection::vec(cache_op_strategy(), 1..60)) {
        let mut store = test_store(TEST_MAX_ITEMS, TEST_MAX_MEMORY);
        let mut expected_hits: u64 = 0;
        let mut expected_misses: u64 = 0;

        for op in ops {
            match op {
                CacheOp::Set { key, value } => {
                    let _ = store.set(key, value);
                }
                CacheOp::Get { key } => match store.get(&key) {
                    Some(_) => expected_hits += 1,
                    None => expected_misses += 1,
                },
                CacheOp::Has { key } => {
                    let _ = store.has(&key);
                }
                CacheOp::Delete { key } => {
                    let _ = store.delete(&key);
                }
                CacheOp::Clear => store.clear(),
                CacheOp::Shrink { .. } => {}
            }
        }

        let stats = store.stats();
        prop_assert_eq!(stats.total_hits, expected_hits, "Hits mismatch");
        prop_assert_eq!(stats.total_misses, expected_misses, "Misses mismatch");
        prop_assert_eq!(stats.total_entries, store.len(), "Total entries mismatch");
        if expected_hits + expected_misses > 0 {
            prop_assert!((stats.hit_rate + stats.miss_rate - 100.0).abs() < 0.011);
        }
    }

    // Storing V1 then V2 under one key returns V2 and counts the key once.
    #[test]
    fn prop_overwrite_semantics(
        key in key_strategy(),
        value1 in value_strategy(),
        value2 in value_strategy()
    ) {
        let mut store = test_store(TEST_MAX_ITEMS, TEST_MAX_MEMORY);

        store.set(key.clone(), value1).unwrap();
        store.set(key.clone(), value2.clone()).unwrap();

        prop_assert_eq!(store.len(), 1, "Should have exactly one entry after overwrite");
        prop_assert_eq!(store.memory_bytes(), value2.len() + 2 + ENTRY_OVERHEAD_BYTES);
        let retrieved = store.get(&key).unwrap();
        prop_assert_eq!(retrieved.as_str(), value2.as_str(), "Overwrite should return new value");
    }

    // A key read just before an insertion into a full cache is not the one
    // evicted; the next least recently used key is.
    #[test]
    fn prop_lru_access_tracking(
        keys in prop::collection::hash_set("[a-z]{3,6}", 3..8),
        access_index in 0usize..8,
        new_key in "[0-9]{3}"
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let capacity = keys.len();
        let mut store = test_store(capacity, usize::MAX);

        for key in &keys {
            store.set(key.clone(), format!("value_{}", key)).unwrap();
        }

        let accessed = keys[access_index % capacity].clone();
        store.get(&accessed).unwrap();

        let expected_evicted = keys
            .iter()
            .find(|k| **k != accessed)
            .cloned()
            .unwrap();

        store.set(new_key.clone(), "new".to_string()).unwrap();

        prop_assert_eq!(store.len(), capacity);
        prop_assert!(store.has(&accessed), "Accessed key should survive");
        prop_assert!(!store.has(&expected_evicted), "LRU key should be evicted");
        prop_assert!(store.has(&new_key), "New key should exist");
    }

    // Entries too large for the whole budget are never admitted.
    #[test]
    fn prop_oversized_never_admitted(sizes in prop::collection::vec(0usize..40_000, 1..30)) {
        let mut store: CacheStore<String> = test_store(TEST_MAX_ITEMS, TEST_MAX_MEMORY);

        for (i, size) in sizes.into_iter().enumerate() {
            let key = format!("k{}", i);
            let admitted = store
                .insert_sized(key.clone(), Arc::new(String::new()), size)
                .is_ok();

            prop_assert_eq!(admitted, size <= TEST_MAX_MEMORY);
            prop_assert_eq!(store.has(&key), admitted);
            prop_assert!(store.memory_bytes() <= TEST_MAX_MEMORY);
        }
    }
}

// == Additional Unit Tests for Edge Cases ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_sized_entries_still_count_against_max_items() {
        let mut store = test_store(1, 1);
        store.insert_sized("free".to_string(), Arc::new(String::new()), 0).unwrap();
        store.insert_sized("also_free".to_string(), Arc::new(String::new()), 0).unwrap();

        assert_eq!(store.len(), 1);
        assert!(store.has("also_free"));
    }
}
