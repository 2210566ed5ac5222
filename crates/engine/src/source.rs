//! Watch source interface

use crate::config::RepoConfig;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("cannot watch {path}: {reason}")]
    Start { path: String, reason: String },
}

/// Starts per-repository change streams
///
/// Implementations merge repeated notifications for the same path within
/// the repository's debounce interval and drop excluded paths before
/// delivering anything.
pub trait WatchSource: Send + Sync {
    fn start(&self, repo: &RepoConfig) -> Result<WatchStream, WatchError>;
}

type StopFn = Box<dyn FnOnce() + Send>;

/// Serial stream of changed paths for one repository
///
/// The stream ending (all senders dropped) is the scheduler's shutdown
/// signal. The channel is unbounded: senders never block, which keeps
/// `stop` from waiting on a receiver that is itself waiting on `stop`.
/// Volume is bounded by the number of distinct debounced paths.
pub struct WatchStream {
    changes: mpsc::UnboundedReceiver<String>,
    stop: Option<StopFn>,
}

impl WatchStream {
    pub fn new(changes: mpsc::UnboundedReceiver<String>, stop: impl FnOnce() + Send + 'static) -> Self {
        Self {
            changes,
            stop: Some(Box::new(stop)),
        }
    }

    /// A stream with nothing to stop beyond its channel
    pub fn from_receiver(changes: mpsc::UnboundedReceiver<String>) -> Self {
        Self {
            changes,
            stop: None,
        }
    }

    /// Next changed path, `None` once the stream has ended
    pub async fn recv(&mut self) -> Option<String> {
        self.changes.recv().await
    }

    /// Paths already delivered but not yet received
    pub fn try_recv(&mut self) -> Option<String> {
        self.changes.try_recv().ok()
    }

    /// Stop the underlying source; idempotent
    ///
    /// Blocks until the source has delivered everything it still held.
    pub fn stop(&mut self) {
        if let Some(stop) = self.stop.take() {
            stop();
        }
    }
}

impl Drop for WatchStream {
    fn drop(&mut self) {
        self.stop();
    }
}
