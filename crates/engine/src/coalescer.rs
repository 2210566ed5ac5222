//! Batch/idle coalescing state machine
//!
//! Accumulates distinct changed paths and tracks the two flush deadlines:
//! - the batch deadline is armed by the first change of a burst and is never
//!   pushed back, bounding worst-case commit latency
//! - the idle deadline is re-armed by every change and fires after a quiet
//!   period
//!
//! The coalescer performs no I/O and owns no timers. The scheduler polls the
//! deadlines it exposes.

use std::collections::HashSet;
use std::fmt;
use std::time::Duration;
use tokio::time::Instant;

/// Why a flush happened (diagnostics only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FlushCause {
    Batch,
    Idle,
    Interval,
    Shutdown,
}

impl fmt::Display for FlushCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FlushCause::Batch => "batch",
            FlushCause::Idle => "idle",
            FlushCause::Interval => "interval",
            FlushCause::Shutdown => "shutdown",
        };
        f.write_str(s)
    }
}

/// Observable state of a repository's coalescer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Nothing pending, no deadline armed
    Idle,
    /// Paths pending, deadlines armed per configuration
    Accumulating,
}

#[derive(Debug)]
pub struct Coalescer {
    batch_window: Option<Duration>,
    idle_window: Option<Duration>,
    pending: HashSet<String>,
    batch_deadline: Option<Instant>,
    idle_deadline: Option<Instant>,
}

impl Coalescer {
    pub fn new(batch_window: Option<Duration>, idle_window: Option<Duration>) -> Self {
        Self {
            batch_window,
            idle_window,
            pending: HashSet::new(),
            batch_deadline: None,
            idle_deadline: None,
        }
    }

    /// Record a changed path observed at `now`
    ///
    /// A window too large to be represented as a deadline never fires.
    pub fn on_change(&mut self, path: String, now: Instant) {
        let starts_burst = self.pending.is_empty();
        self.pending.insert(path);

        if starts_burst {
            self.batch_deadline = self.batch_window.and_then(|w| now.checked_add(w));
        }
        self.idle_deadline = self.idle_window.and_then(|w| now.checked_add(w));
    }

    /// Snapshot and clear the pending set, disarming both deadlines
    pub fn take(&mut self) -> Vec<String> {
        self.batch_deadline = None;
        self.idle_deadline = None;
        let mut paths: Vec<String> = self.pending.drain().collect();
        paths.sort_unstable();
        paths
    }

    pub fn batch_deadline(&self) -> Option<Instant> {
        self.batch_deadline
    }

    pub fn idle_deadline(&self) -> Option<Instant> {
        self.idle_deadline
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn state(&self) -> RunState {
        if self.pending.is_empty() {
            RunState::Idle
        } else {
            RunState::Accumulating
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BATCH: Duration = Duration::from_secs(45);
    const IDLE: Duration = Duration::from_secs(5);

    #[test]
    fn test_first_change_arms_both_deadlines() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(Some(BATCH), Some(IDLE));
        assert_eq!(c.state(), RunState::Idle);

        c.on_change("f1".into(), t0);

        assert_eq!(c.state(), RunState::Accumulating);
        assert_eq!(c.batch_deadline(), Some(t0 + BATCH));
        assert_eq!(c.idle_deadline(), Some(t0 + IDLE));
    }

    #[test]
    fn test_later_changes_reset_idle_but_not_batch() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(Some(BATCH), Some(IDLE));

        c.on_change("f1".into(), t0);
        c.on_change("f2".into(), t0 + Duration::from_secs(3));
        c.on_change("f1".into(), t0 + Duration::from_secs(6));

        assert_eq!(c.pending_len(), 2);
        assert_eq!(c.batch_deadline(), Some(t0 + BATCH));
        assert_eq!(c.idle_deadline(), Some(t0 + Duration::from_secs(6) + IDLE));
    }

    #[test]
    fn test_take_clears_and_disarms() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(Some(BATCH), Some(IDLE));
        c.on_change("b.txt".into(), t0);
        c.on_change("a.txt".into(), t0);
        c.on_change("b.txt".into(), t0);

        assert_eq!(c.take(), vec!["a.txt".to_string(), "b.txt".to_string()]);
        assert_eq!(c.state(), RunState::Idle);
        assert!(c.batch_deadline().is_none());
        assert!(c.idle_deadline().is_none());
        assert!(c.take().is_empty());
    }

    #[test]
    fn test_next_burst_gets_fresh_batch_deadline() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(Some(BATCH), Some(IDLE));
        c.on_change("f1".into(), t0);
        c.take();

        let t1 = t0 + Duration::from_secs(60);
        c.on_change("f2".into(), t1);
        assert_eq!(c.batch_deadline(), Some(t1 + BATCH));
    }

    #[test]
    fn test_disabled_windows_arm_nothing() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(None, None);
        c.on_change("f1".into(), t0);

        assert_eq!(c.state(), RunState::Accumulating);
        assert!(c.batch_deadline().is_none());
        assert!(c.idle_deadline().is_none());
    }

    #[test]
    fn test_unrepresentable_window_never_fires() {
        let t0 = Instant::now();
        let mut c = Coalescer::new(Some(Duration::MAX), Some(IDLE));
        c.on_change("f1".into(), t0);

        assert!(c.batch_deadline().is_none());
        assert_eq!(c.idle_deadline(), Some(t0 + IDLE));
    }

    #[test]
    fn test_flush_cause_display() {
        assert_eq!(FlushCause::Batch.to_string(), "batch");
        assert_eq!(FlushCause::Shutdown.to_string(), "shutdown");
    }
}
