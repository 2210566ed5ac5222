//! Per-repository commit scheduler
//!
//! One decision loop per repository merges:
//! - changed paths from the watch stream
//! - the batch and idle deadlines held by the [`Coalescer`]
//! - the optional fixed-cadence interval ticker
//! - the end of the watch stream, or a process shutdown request
//!
//! Timer expirations are futures polled by the same `select!` as the change
//! stream, so exactly one transition is applied at a time and the pending set
//! is never touched from another context. The commit backend runs inline on
//! the loop, which makes at most one flush in flight per repository.

use crate::backend::CommitBackend;
use crate::coalescer::{Coalescer, FlushCause};
use crate::config::RepoConfig;
use crate::source::WatchStream;
use std::future::pending;
use std::sync::Arc;
use tokio::sync::watch;
use tokio::time::{interval_at, sleep_until, Instant, Interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Inputs consumed by one scheduler run
#[derive(Default)]
pub struct SchedulerInput {
    /// Change stream, absent when watching is disabled or failed to start
    pub changes: Option<WatchStream>,
    /// Process-wide shutdown request (`true` = stop)
    pub shutdown: Option<watch::Receiver<bool>>,
}

/// Why a scheduler stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerExit {
    /// Input ended and the final flush ran
    Drained,
    /// Neither a change stream nor an interval was available
    NoInput,
}

/// Counters reported when a scheduler terminates
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchedulerReport {
    pub exit: SchedulerExit,
    /// Backend invocations
    pub flushes: usize,
    /// Flushes that produced a commit
    pub commits: usize,
    /// Flushes whose backend call failed (their paths are dropped)
    pub failures: usize,
}

pub struct RepoScheduler {
    config: RepoConfig,
    backend: Arc<dyn CommitBackend>,
    coalescer: Coalescer,
    flushes: usize,
    commits: usize,
    failures: usize,
}

impl RepoScheduler {
    pub fn new(config: RepoConfig, backend: Arc<dyn CommitBackend>) -> Self {
        let coalescer = Coalescer::new(config.batch_window(), config.idle_window());
        Self {
            config,
            backend,
            coalescer,
            flushes: 0,
            commits: 0,
            failures: 0,
        }
    }

    /// Run until the change stream ends (or shutdown is requested), then
    /// perform the final shutdown flush
    pub async fn run(mut self, input: SchedulerInput) -> SchedulerReport {
        let SchedulerInput {
            mut changes,
            mut shutdown,
        } = input;

        let mut ticker = self.config.interval().and_then(|period| {
            let start = Instant::now().checked_add(period)?;
            let mut ticker = interval_at(start, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            Some(ticker)
        });

        if changes.is_none() && ticker.is_none() {
            warn!(
                repo = %self.config.path.display(),
                "No change stream and no interval; repository will never commit"
            );
            return self.report(SchedulerExit::NoInput);
        }

        info!(
            repo = %self.config.path.display(),
            watching = changes.is_some(),
            interval = ?self.config.interval(),
            batch_window = ?self.config.batch_window(),
            idle_window = ?self.config.idle_window(),
            "Scheduler started"
        );

        loop {
            let batch = self.coalescer.batch_deadline();
            let idle = self.coalescer.idle_deadline();

            // Deadlines are polled before new input so flushes follow the
            // order in which their deadlines passed.
            tokio::select! {
                biased;

                _ = fire_at(batch) => self.flush(FlushCause::Batch),
                _ = fire_at(idle) => self.flush(FlushCause::Idle),
                _ = tick(&mut ticker) => self.flush(FlushCause::Interval),
                change = next_change(&mut changes) => match change {
                    Some(path) => {
                        self.coalescer.on_change(path, Instant::now());
                        debug!(
                            repo = %self.config.path.display(),
                            pending = self.coalescer.pending_len(),
                            "Change"
                        );
                    }
                    None => {
                        debug!(repo = %self.config.path.display(), "Change stream ended");
                        break;
                    }
                },
                requested = shutdown_requested(&mut shutdown) => {
                    if requested {
                        info!(repo = %self.config.path.display(), "Shutdown requested");
                        self.drain(&mut changes);
                        break;
                    }
                    // Sender gone: nobody can ask us to stop any more.
                    shutdown = None;
                }
            }
        }

        self.flush(FlushCause::Shutdown);
        info!(
            repo = %self.config.path.display(),
            flushes = self.flushes,
            commits = self.commits,
            failures = self.failures,
            "Scheduler terminated"
        );
        self.report(SchedulerExit::Drained)
    }

    /// Stop the watch source and pick up everything it already delivered
    fn drain(&mut self, changes: &mut Option<WatchStream>) {
        if let Some(mut stream) = changes.take() {
            stream.stop();
            let now = Instant::now();
            while let Some(path) = stream.try_recv() {
                self.coalescer.on_change(path, now);
            }
        }
    }

    fn flush(&mut self, cause: FlushCause) {
        let paths = self.coalescer.take();

        // The backend inspects the working tree itself, so interval-driven
        // repositories are delegated even an empty list.
        if paths.is_empty() && self.config.interval().is_none() {
            debug!(repo = %self.config.path.display(), %cause, "Nothing pending, flush skipped");
            return;
        }

        self.flushes += 1;
        debug!(
            repo = %self.config.path.display(),
            %cause,
            files = paths.len(),
            "Flushing"
        );

        match self.backend.commit(&self.config, &paths) {
            Ok(Some(summary)) => {
                self.commits += 1;
                info!(
                    repo = %self.config.path.display(),
                    %cause,
                    files = paths.len(),
                    "Committed: {}",
                    summary
                );
            }
            Ok(None) => {
                debug!(repo = %self.config.path.display(), %cause, "Nothing to commit");
            }
            Err(e) => {
                self.failures += 1;
                error!(
                    repo = %self.config.path.display(),
                    %cause,
                    dropped = paths.len(),
                    "Flush failed: {}",
                    e
                );
            }
        }
    }

    fn report(&self, exit: SchedulerExit) -> SchedulerReport {
        SchedulerReport {
            exit,
            flushes: self.flushes,
            commits: self.commits,
            failures: self.failures,
        }
    }
}

async fn fire_at(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => pending().await,
    }
}

async fn tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(ticker) => {
            ticker.tick().await;
        }
        None => pending().await,
    }
}

async fn next_change(changes: &mut Option<WatchStream>) -> Option<String> {
    match changes {
        Some(stream) => stream.recv().await,
        None => pending().await,
    }
}

/// Resolves `true` once shutdown is requested, `false` if the sender is gone
async fn shutdown_requested(shutdown: &mut Option<watch::Receiver<bool>>) -> bool {
    let Some(rx) = shutdown else {
        return pending().await;
    };
    loop {
        if *rx.borrow_and_update() {
            return true;
        }
        if rx.changed().await.is_err() {
            return false;
        }
    }
}
