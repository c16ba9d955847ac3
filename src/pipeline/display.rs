//! Display buffer - bounded, most-recent-first window of released records

use super::types::TxRecord;
use std::collections::{HashSet, VecDeque};

/// Number of records visible to consumers
pub const DISPLAY_CAPACITY: usize = 200;

/// Bounded window of released records, newest at the front
///
/// A hash index mirrors the deque so membership checks stay O(1) while the
/// ingestor filters every incoming batch against it.
#[derive(Debug, Clone)]
pub struct DisplayBuffer {
    records: VecDeque<TxRecord>,
    hashes: HashSet<String>,
    capacity: usize,
}

impl Default for DisplayBuffer {
    fn default() -> Self {
        Self::new(DISPLAY_CAPACITY)
    }
}

impl DisplayBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            records: VecDeque::with_capacity(capacity + 1),
            hashes: HashSet::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Insert at the head, evicting from the tail past capacity
    ///
    /// Returns `false` without touching the buffer if the hash is already shown.
    pub fn publish(&mut self, record: TxRecord) -> bool {
        if self.hashes.contains(&record.hash) {
            return false;
        }

        self.hashes.insert(record.hash.clone());
        self.records.push_front(record);

        while self.records.len() > self.capacity {
            if let Some(evicted) = self.records.pop_back() {
                self.hashes.remove(&evicted.hash);
            }
        }
        true
    }

    /// Copy of the window, most recent first
    pub fn snapshot(&self) -> Vec<TxRecord> {
        self.records.iter().cloned().collect()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
