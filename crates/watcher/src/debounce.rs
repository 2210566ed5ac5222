//! Per-path debouncing
//!
//! Rapid repeated notifications for the same path collapse into a single
//! delivery once that path has been quiet for the configured delay. Each
//! path has its own deadline, so a busy file never holds back other files.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    /// path -> instant at which it becomes deliverable
    pending: HashMap<String, Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: HashMap::new(),
        }
    }

    /// Record a notification, pushing the path's deadline back
    pub fn record(&mut self, path: String, now: Instant) {
        self.pending.insert(path, now + self.delay);
    }

    /// Earliest pending deadline
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending.values().min().copied()
    }

    /// Remove and return every path whose deadline has passed, oldest first
    pub fn drain_ready(&mut self, now: Instant) -> Vec<String> {
        let mut ready: Vec<(Instant, String)> = self
            .pending
            .iter()
            .filter(|(_, deadline)| **deadline <= now)
            .map(|(path, deadline)| (*deadline, path.clone()))
            .collect();
        for (_, path) in &ready {
            self.pending.remove(path);
        }
        ready.sort();
        ready.into_iter().map(|(_, path)| path).collect()
    }

    /// Remove and return everything still pending
    pub fn drain_all(&mut self) -> Vec<String> {
        let mut all: Vec<(Instant, String)> = self
            .pending
            .drain()
            .map(|(path, deadline)| (deadline, path))
            .collect();
        all.sort();
        all.into_iter().map(|(_, path)| path).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
