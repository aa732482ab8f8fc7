//! Per-sink counters

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for a single capture sink
#[derive(Debug, Default)]
pub struct SinkMetrics {
    /// Records appended since the last (re)open
    records: AtomicU64,
    /// Records appended over the sink's lifetime
    total_records: AtomicU64,
    /// Failed appends, opens and closes
    failure_count: AtomicU64,
    /// Successful reopens
    reopen_count: AtomicU64,
}

impl SinkMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Records in the current capture file
    pub fn records(&self) -> u64 {
        self.records.load(Ordering::Relaxed)
    }

    /// Records across every capture file this sink has written
    pub fn total_records(&self) -> u64 {
        self.total_records.load(Ordering::Relaxed)
    }

    pub fn inc_records(&self) {
        self.records.fetch_add(1, Ordering::Relaxed);
        self.total_records.fetch_add(1, Ordering::Relaxed);
    }

    /// A fresh file was opened: the per-file count starts over
    pub fn reset_records(&self) {
        self.records.store(0, Ordering::Relaxed);
    }

    pub fn failure_count(&self) -> u64 {
        self.failure_count.load(Ordering::Relaxed)
    }

    pub fn inc_failure_count(&self) {
        self.failure_count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn reopen_count(&self) -> u64 {
        self.reopen_count.load(Ordering::Relaxed)
    }

    pub fn inc_reopen_count(&self) {
        self.reopen_count.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records: self.records(),
            total_records: self.total_records(),
            failure_count: self.failure_count(),
            reopen_count: self.reopen_count(),
        }
    }
}

/// Snapshot of sink metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub records: u64,
    pub total_records: u64,
    pub failure_count: u64,
    pub reopen_count: u64,
}
