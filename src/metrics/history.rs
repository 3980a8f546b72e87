//! Bounded rolling history of recent snapshots.

use crate::metrics::data::Snapshot;
use parking_lot::RwLock;
use std::collections::VecDeque;

/// Oldest-evicting store of the most recent snapshots.
///
/// Readers share a read lock and always get owned copies, so consumers can
/// never mutate the buffer. `add` and `clear` take the write lock for the
/// whole mutation, which means no reader observes more than `capacity`
/// entries or a partially written snapshot.
///
/// Every `add` is numbered from a counter that only grows, including across
/// `clear`. The broadcast hub compares these numbers to tell which live
/// snapshots a new subscriber already got through replay, independent of
/// the wall clock.
#[derive(Debug)]
pub struct HistoryRing {
    entries: RwLock<Entries>,
    capacity: usize,
}

#[derive(Debug)]
struct Entries {
    snapshots: VecDeque<Snapshot>,
    /// Sequence number of the newest add, 0 before the first one
    last_sequence: u64,
}

impl HistoryRing {
    /// Create a ring holding at most `capacity` snapshots.
    ///
    /// A capacity of zero falls back to [`crate::DEFAULT_HISTORY_SIZE`].
    pub fn new(capacity: usize) -> Self {
        let capacity = if capacity == 0 {
            crate::DEFAULT_HISTORY_SIZE
        } else {
            capacity
        };

        Self {
            entries: RwLock::new(Entries {
                snapshots: VecDeque::with_capacity(capacity),
                last_sequence: 0,
            }),
            capacity,
        }
    }

    /// Append a snapshot, dropping the oldest entries past capacity.
    ///
    /// Returns the sequence number assigned to it. Numbers start at 1.
    pub fn add(&self, snapshot: Snapshot) -> u64 {
        let mut entries = self.entries.write();
        entries.last_sequence += 1;
        entries.snapshots.push_back(snapshot);
        while entries.snapshots.len() > self.capacity {
            entries.snapshots.pop_front();
        }
        entries.last_sequence
    }

    /// Copy of every stored snapshot, oldest first.
    pub fn get_history(&self) -> Vec<Snapshot> {
        self.entries.read().snapshots.iter().cloned().collect()
    }

    /// Copy of the history together with the sequence number of the newest
    /// add, both read under one lock.
    pub fn get_history_sequenced(&self) -> (Vec<Snapshot>, u64) {
        let entries = self.entries.read();
        (entries.snapshots.iter().cloned().collect(), entries.last_sequence)
    }

    /// Copy of the most recently added snapshot.
    pub fn get_latest(&self) -> Option<Snapshot> {
        self.entries.read().snapshots.back().cloned()
    }

    pub fn size(&self) -> usize {
        self.entries.read().snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().snapshots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop every stored snapshot. Capacity and numbering are unchanged.
    pub fn clear(&self) {
        self.entries.write().snapshots.clear();
    }
}

impl Default for HistoryRing {
    fn default() -> Self {
        Self::new(crate::DEFAULT_HISTORY_SIZE)
    }
}
