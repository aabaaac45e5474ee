//! CABINET - Store Metrics
//! Operation counters and accumulated time for `MeteredStore`.
//!
//! Counters use `AtomicU64` so they can be read through a shared
//! reference while the store is borrowed elsewhere.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Kinds of store operations tracked by the meter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Edit,
    Remove,
    Purge,
    Find,
    List,
    Snapshot,
    Restore,
}

/// Atomic operation counters for a record store.
#[derive(Debug)]
pub struct StoreMetrics {
    /// Total number of `create` calls.
    pub creates: AtomicU64,
    /// Total number of `edit`/`edit_by_id` calls.
    pub edits: AtomicU64,
    /// Total number of `remove` calls.
    pub removes: AtomicU64,
    /// Total number of `purge` calls.
    pub purges: AtomicU64,
    /// Total number of `find_*` calls.
    pub finds: AtomicU64,
    /// Total number of `get_all`/`count` calls.
    pub lists: AtomicU64,
    /// Total number of `make_snapshot` calls.
    pub snapshots: AtomicU64,
    /// Total number of `restore` calls.
    pub restores: AtomicU64,
    /// Time spent inside the wrapped store, in nanoseconds.
    pub elapsed_ns: AtomicU64,
    /// When metering started.
    started: Instant,
}

impl StoreMetrics {
    /// Create a new metrics instance with all counters at zero.
    pub fn new() -> Self {
        Self {
            creates: AtomicU64::new(0),
            edits: AtomicU64::new(0),
            removes: AtomicU64::new(0),
            purges: AtomicU64::new(0),
            finds: AtomicU64::new(0),
            lists: AtomicU64::new(0),
            snapshots: AtomicU64::new(0),
            restores: AtomicU64::new(0),
            elapsed_ns: AtomicU64::new(0),
            started: Instant::now(),
        }
    }

    /// Record one completed operation and how long it took.
    pub fn record(&self, op: Operation, elapsed: Duration) {
        let counter = match op {
            Operation::Create => &self.creates,
            Operation::Edit => &self.edits,
            Operation::Remove => &self.removes,
            Operation::Purge => &self.purges,
            Operation::Find => &self.finds,
            Operation::List => &self.lists,
            Operation::Snapshot => &self.snapshots,
            Operation::Restore => &self.restores,
        };
        counter.fetch_add(1, Ordering::Relaxed);
        self.elapsed_ns
            .fetch_add(elapsed.as_nanos() as u64, Ordering::Relaxed);
    }

    /// Total number of metered operations.
    pub fn total_ops(&self) -> u64 {
        [
            &self.creates,
            &self.edits,
            &self.removes,
            &self.purges,
            &self.finds,
            &self.lists,
            &self.snapshots,
            &self.restores,
        ]
        .iter()
        .map(|c| c.load(Ordering::Relaxed))
        .sum()
    }

    /// Time spent inside the store.
    pub fn elapsed(&self) -> Duration {
        Duration::from_nanos(self.elapsed_ns.load(Ordering::Relaxed))
    }

    /// Seconds since metering started.
    pub fn uptime_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }

    /// Format metrics as a human-readable report.
    pub fn report(&self) -> String {
        format!(
            "\n═══ Cabinet Store Metrics ═══\n\
             Operations:\n\
               creates:   {}\n\
               edits:     {}\n\
               removes:   {}\n\
               purges:    {}\n\
               finds:     {}\n\
               lists:     {}\n\
               snapshots: {}\n\
               restores:  {}\n\
             Time:\n\
               total ops: {}\n\
               in store:  {:?}\n\
             Uptime: {:.2}s",
            self.creates.load(Ordering::Relaxed),
            self.edits.load(Ordering::Relaxed),
            self.removes.load(Ordering::Relaxed),
            self.purges.load(Ordering::Relaxed),
            self.finds.load(Ordering::Relaxed),
            self.lists.load(Ordering::Relaxed),
            self.snapshots.load(Ordering::Relaxed),
            self.restores.load(Ordering::Relaxed),
            self.total_ops(),
            self.elapsed(),
            self.uptime_secs(),
        )
    }
}

impl Default for StoreMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_operations() {
        let m = StoreMetrics::new();

        m.record(Operation::Create, Duration::from_micros(5));
        m.record(Operation::Create, Duration::from_micros(5));
        m.record(Operation::Find, Duration::from_micros(2));
        m.record(Operation::Purge, Duration::ZERO);

        assert_eq!(m.creates.load(Ordering::Relaxed), 2);
        assert_eq!(m.finds.load(Ordering::Relaxed), 1);
        assert_eq!(m.purges.load(Ordering::Relaxed), 1);
        assert_eq!(m.total_ops(), 4);
        assert_eq!(m.elapsed(), Duration::from_micros(12));
    }

    #[test]
    fn test_report_format() {
        let m = StoreMetrics::new();
        m.record(Operation::Remove, Duration::from_millis(1));
        let report = m.report();
        assert!(report.contains("removes:   1"));
        assert!(report.contains("in store:"));
    }

    #[test]
    fn test_default() {
        let m = StoreMetrics::default();
        assert_eq!(m.total_ops(), 0);
    }
}
