//! File system watching for autocommit
//!
//! This crate provides the concrete watch source:
//! - Recursive native notifications via `notify`
//! - Per-path debouncing
//! - Built-in, `.gitignore` and configured exclusions
//!
//! Paths are delivered relative to the repository root.

pub mod debounce;
pub mod ignore;

pub use debounce::Debouncer;
pub use ignore::{is_excluded, IgnoreRules};

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender};
use engine::{RepoConfig, WatchError, WatchSource, WatchStream};
use notify::{EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::Path;
use std::thread;
use std::time::Instant;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};

/// Messages consumed by the debounce thread
enum Msg {
    Fs(notify::Result<notify::Event>),
    Stop,
}

/// Watch source backed by native file system notifications
#[derive(Debug, Default, Clone, Copy)]
pub struct FsWatchSource;

impl WatchSource for FsWatchSource {
    fn start(&self, repo: &RepoConfig) -> Result<WatchStream, WatchError> {
        let start_error = |reason: String| WatchError::Start {
            path: repo.path.display().to_string(),
            reason,
        };

        // notify reports canonical paths on some platforms
        let root = repo
            .path
            .canonicalize()
            .map_err(|e| start_error(e.to_string()))?;
        let rules = IgnoreRules::load(&root, repo.parse_gitignore, &repo.excludes)
            .map_err(|e| start_error(e.to_string()))?;

        let (raw_tx, raw_rx) = crossbeam_channel::unbounded();
        let event_tx = raw_tx.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
            let _ = event_tx.send(Msg::Fs(res));
        })
        .map_err(|e| start_error(e.to_string()))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| start_error(e.to_string()))?;

        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        let debouncer = Debouncer::new(repo.debounce);
        let rule_sources = rules.active_sources();
        let handle = thread::Builder::new()
            .name(format!("autocommit-watch-{}", repo.label()))
            .spawn(move || debounce_loop(raw_rx, out_tx, debouncer, rules))
            .map_err(|e| start_error(e.to_string()))?;

        info!(
            repo = %root.display(),
            debounce = ?repo.debounce,
            rule_sources,
            "Watching"
        );

        let stop = move || stop_watching(watcher, raw_tx, handle);
        Ok(WatchStream::new(out_rx, stop))
    }
}

fn stop_watching(watcher: RecommendedWatcher, raw_tx: Sender<Msg>, handle: thread::JoinHandle<()>) {
    drop(watcher);
    let _ = raw_tx.send(Msg::Stop);
    if handle.join().is_err() {
        warn!("Debounce thread panicked");
    }
}

/// Debounce raw notifications and forward settled paths
///
/// Ends on stop, on a watch error, or when the receiving side is gone.
/// Everything still pending is delivered before the stream closes.
fn debounce_loop(
    raw: Receiver<Msg>,
    out: UnboundedSender<String>,
    mut debouncer: Debouncer,
    rules: IgnoreRules,
) {
    loop {
        let received = match debouncer.next_deadline() {
            Some(deadline) => raw.recv_deadline(deadline),
            None => raw.recv().map_err(|_| RecvTimeoutError::Disconnected),
        };

        match received {
            Ok(Msg::Fs(Ok(event))) => record_event(&event, &rules, &mut debouncer),
            Ok(Msg::Fs(Err(e))) => {
                warn!(repo = %rules.repo_root().display(), "Watch error, closing stream: {}", e);
                break;
            }
            Ok(Msg::Stop) | Err(RecvTimeoutError::Disconnected) => break,
            Err(RecvTimeoutError::Timeout) => {}
        }

        for path in debouncer.drain_ready(Instant::now()) {
            if out.send(path).is_err() {
                return;
            }
        }
    }

    for path in debouncer.drain_all() {
        let _ = out.send(path);
    }
    debug!(repo = %rules.repo_root().display(), "Watch stream closed");
}

fn record_event(event: &notify::Event, rules: &IgnoreRules, debouncer: &mut Debouncer) {
    if matches!(event.kind, EventKind::Access(_)) {
        return;
    }

    let now = Instant::now();
    for path in &event.paths {
        let Some(rel) = relative_to(path, rules.repo_root()) else {
            continue;
        };
        if is_excluded(rel, path.is_dir(), rules) {
            continue;
        }
        debouncer.record(rel.to_string_lossy().into_owned(), now);
    }
}

fn relative_to<'a>(path: &'a Path, root: &Path) -> Option<&'a Path> {
    path.strip_prefix(root)
        .ok()
        .filter(|rel| !rel.as_os_str().is_empty())
}
