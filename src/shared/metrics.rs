use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

pub const UNSET_TS: u64 = 0;

/// Lock-free counters for drain-cycle outcomes, readable from any thread.
#[derive(Debug, Default)]
pub struct CycleMetrics {
    completed: AtomicU64,
    failed: AtomicU64,
    skipped: AtomicU64,
    rows_drained: AtomicU64,
    last_completed_ms: AtomicU64,
    last_failed_ms: AtomicU64,
}

#[derive(Debug, Clone, Copy)]
pub struct CycleMetricsSnapshot {
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub rows_drained: u64,
    pub last_completed_ms: Option<u64>,
    pub last_failed_ms: Option<u64>,
}

impl CycleMetrics {
    pub const fn new() -> Self {
        Self {
            completed: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            rows_drained: AtomicU64::new(0),
            last_completed_ms: AtomicU64::new(UNSET_TS),
            last_failed_ms: AtomicU64::new(UNSET_TS),
        }
    }

    pub fn record_completed(&self, rows: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.rows_drained.fetch_add(rows, Ordering::Relaxed);
        self.last_completed_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
        self.last_failed_ms
            .store(current_unix_ms(), Ordering::Relaxed);
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> CycleMetricsSnapshot {
        CycleMetricsSnapshot {
            completed: self.completed.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            rows_drained: self.rows_drained.load(Ordering::Relaxed),
            last_completed_ms: timestamp_to_option(self.last_completed_ms.load(Ordering::Relaxed)),
            last_failed_ms: timestamp_to_option(self.last_failed_ms.load(Ordering::Relaxed)),
        }
    }
}

#[inline]
pub fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(UNSET_TS)
}

#[inline]
pub fn timestamp_to_option(value: u64) -> Option<u64> {
    if value == UNSET_TS { None } else { Some(value) }
}
