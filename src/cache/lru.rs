//! Recency Order Module
//!
//! Tracks access order for LRU eviction.

use std::collections::{BTreeMap, HashMap};

// == Recency Order ==
/// Tracks keys from least to most recently used.
///
/// Every touch stamps the key with a fresh, strictly increasing tick. The
/// `order` map sorts keys by tick, so:
/// - Front (smallest tick) = Least recently used
/// - Back (largest tick) = Most recently used
///
/// `ticks` is the reverse index, which keeps touch and remove logarithmic
/// instead of scanning the whole sequence.
#[derive(Debug, Default)]
pub struct RecencyOrder {
    /// Keys ordered by last touch
    order: BTreeMap<u64, String>,
    /// Current tick of each key
    ticks: HashMap<String, u64>,
    /// Next tick to hand out
    next_tick: u64,
}

impl RecencyOrder {
    // == Constructor ==
    /// Creates a new empty recency order.
    pub fn new() -> Self {
        Self::default()
    }

    // == Touch ==
    /// Marks a key as most recently used (moves it to the back).
    ///
    /// Inserts the key if it was not tracked yet.
    pub fn touch(&mut self, key: &str) {
        let tick = self.next_tick;
        self.next_tick += 1;

        match self.ticks.get_mut(key) {
            Some(old_tick) => {
                if let Some(owned) = self.order.remove(&*old_tick) {
                    self.order.insert(tick, owned);
                }
                *old_tick = tick;
            }
            None => {
                self.order.insert(tick, key.to_string());
                self.ticks.insert(key.to_string(), tick);
            }
        }
    }

    // == Remove ==
    /// Removes a key from the order. Returns whether it was tracked.
    pub fn remove(&mut self, key: &str) -> bool {
        match self.ticks.remove(key) {
            Some(tick) => {
                self.order.remove(&tick);
                true
            }
            None => false,
        }
    }

    // == Pop Least Recent ==
    /// Returns and removes the least recently used key.
    ///
    /// Returns None if the order is empty.
    pub fn pop_least_recent(&mut self) -> Option<String> {
        let (_, key) = self.order.pop_first()?;
        self.ticks.remove(&key);
        Some(key)
    }

    // == Peek Least Recent ==
    /// Returns the least recently used key without removing it.
    pub fn peek_least_recent(&self) -> Option<&str> {
        self.order.values().next().map(String::as_str)
    }

    /// Iterates keys from least to most recently used.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.order.values().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.ticks.contains_key(key)
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.ticks.clear();
    }
}
