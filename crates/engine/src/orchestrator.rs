//! Runs one scheduler per repository
//!
//! Every repository gets its own OS thread with a current-thread tokio
//! runtime. A slow or blocked commit in one repository therefore never delays
//! another, and no state is shared between workers.

use crate::backend::{CommitBackend, CommitError};
use crate::config::RepoConfig;
use crate::scheduler::{RepoScheduler, SchedulerInput, SchedulerReport};
use crate::source::WatchSource;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;
use thiserror::Error;
use tokio::sync::watch;
use tracing::{error, info, warn};

#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("pre-flight check failed: {0}")]
    Check(#[from] CommitError),

    #[error("failed to start worker: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("worker panicked")]
    Panicked,
}

/// How one repository's worker ended
#[derive(Debug)]
pub struct WorkerOutcome {
    pub repo: PathBuf,
    pub result: Result<SchedulerReport, WorkerError>,
}

pub struct Orchestrator {
    source: Arc<dyn WatchSource>,
    backend: Arc<dyn CommitBackend>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn WatchSource>, backend: Arc<dyn CommitBackend>) -> Self {
        Self { source, backend }
    }

    /// Start a worker per repository and block until all of them end
    ///
    /// A worker failing or ending early never cancels its siblings.
    pub fn run_all(
        &self,
        repos: Vec<RepoConfig>,
        shutdown: watch::Receiver<bool>,
    ) -> Vec<WorkerOutcome> {
        info!("Starting {} repository worker(s)", repos.len());

        let workers: Vec<_> = repos
            .into_iter()
            .map(|repo| {
                let path = repo.path.clone();
                let source = Arc::clone(&self.source);
                let backend = Arc::clone(&self.backend);
                let shutdown = shutdown.clone();
                let spawned = thread::Builder::new()
                    .name(format!("autocommit-{}", repo.label()))
                    .spawn(move || run_worker(repo, source, backend, shutdown));
                (path, spawned)
            })
            .collect();

        workers
            .into_iter()
            .map(|(repo, spawned)| {
                let result = match spawned {
                    Ok(handle) => handle.join().unwrap_or(Err(WorkerError::Panicked)),
                    Err(e) => Err(WorkerError::Spawn(e)),
                };
                if let Err(e) = &result {
                    error!(repo = %repo.display(), "Worker ended with error: {}", e);
                }
                WorkerOutcome { repo, result }
            })
            .collect()
    }
}

fn run_worker(
    repo: RepoConfig,
    source: Arc<dyn WatchSource>,
    backend: Arc<dyn CommitBackend>,
    shutdown: watch::Receiver<bool>,
) -> Result<SchedulerReport, WorkerError> {
    backend.check(&repo)?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()?;

    let changes = if repo.watch {
        match source.start(&repo) {
            Ok(stream) => Some(stream),
            Err(e) => {
                error!(repo = %repo.path.display(), "Watch failed to start: {}", e);
                if repo.interval().is_some() {
                    warn!(repo = %repo.path.display(), "Falling back to interval-only commits");
                }
                None
            }
        }
    } else {
        None
    };

    let input = SchedulerInput {
        changes,
        shutdown: Some(shutdown),
    };
    let scheduler = RepoScheduler::new(repo, backend);
    Ok(runtime.block_on(scheduler.run(input)))
}
