//! In-flight load accounting.
//!
//! Only scalar counters are mutated, so atomics are enough; no locking.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counts the requests a process has started but not yet finished.
///
/// `begin` hands out a guard; dropping the guard decrements the counter, so
/// the decrement is paired with the increment on every exit path, including
/// handler errors and early returns.
#[derive(Debug, Default)]
pub struct LoadTracker {
    active: AtomicU64,
    total_handled: AtomicU64,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark one request as started.
    pub fn begin(self: &Arc<Self>) -> LoadGuard {
        self.active.fetch_add(1, Ordering::Relaxed);
        LoadGuard {
            tracker: Arc::clone(self),
        }
    }

    /// Point-in-time snapshot of the active count. Not synchronized with
    /// any specific request.
    pub fn current(&self) -> u64 {
        self.active.load(Ordering::Relaxed)
    }

    /// Total requests finished since startup.
    pub fn total_handled(&self) -> u64 {
        self.total_handled.load(Ordering::Relaxed)
    }
}

/// RAII guard for one in-flight request.
#[derive(Debug)]
pub struct LoadGuard {
    tracker: Arc<LoadTracker>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.tracker.active.fetch_sub(1, Ordering::Relaxed);
        self.tracker.total_handled.fetch_add(1, Ordering::Relaxed);
    }
}
