//! Run the autocommit daemon in the foreground

use crate::locks::DaemonLock;
use crate::{logging, system_config};
use anyhow::{Context, Result};
use engine::{Orchestrator, RepoConfig, SchedulerExit, WorkerOutcome};
use gitops::GitBackend;
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};
use watcher::FsWatchSource;

pub async fn run(config_path: Option<&Path>, only: &[PathBuf]) -> Result<()> {
    let path = system_config::resolve_path(config_path)?;
    let config = system_config::load_from(&path)?;
    config.validate().context("Invalid configuration")?;

    let _log_guard = logging::init(config.log_dir.as_deref())?;

    let repos = select_repos(config.repos, only)?;
    if repos.is_empty() {
        anyhow::bail!(
            "No repositories configured in {} (add one with `autocommit add-repo <path>`)",
            path.display()
        );
    }

    let lock_dir = path
        .parent()
        .context("Config file has no parent directory")?;
    let _lock = DaemonLock::acquire(lock_dir)?;

    info!(config = %path.display(), "autocommit starting");

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let orchestrator = Orchestrator::new(Arc::new(FsWatchSource), Arc::new(GitBackend));
    let mut workers = tokio::task::spawn_blocking(move || orchestrator.run_all(repos, shutdown_rx));

    let outcomes = tokio::select! {
        joined = &mut workers => joined.context("Worker pool failed")?,
        _ = shutdown_signal() => {
            info!("Shutdown requested, flushing pending changes");
            let _ = shutdown_tx.send(true);
            workers.await.context("Worker pool failed")?
        }
    };

    report(&outcomes)
}

/// Restrict to the repositories named with `--repo`
fn select_repos(repos: Vec<RepoConfig>, only: &[PathBuf]) -> Result<Vec<RepoConfig>> {
    if only.is_empty() {
        return Ok(repos);
    }

    let wanted: Vec<PathBuf> = only.iter().map(|p| normalize(p)).collect();
    let selected: Vec<RepoConfig> = repos
        .into_iter()
        .filter(|r| wanted.contains(&normalize(&r.path)))
        .collect();

    if selected.len() < wanted.len() {
        anyhow::bail!("Some --repo paths are not in the configuration");
    }
    Ok(selected)
}

fn normalize(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for ctrl-c: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

fn report(outcomes: &[WorkerOutcome]) -> Result<()> {
    let mut failed = 0;

    for outcome in outcomes {
        let repo = outcome.repo.display();
        match &outcome.result {
            Ok(r) => {
                let status = match r.exit {
                    SchedulerExit::Drained => "stopped".green().to_string(),
                    SchedulerExit::NoInput => "no input".yellow().to_string(),
                };
                println!(
                    "{} {} {}",
                    repo,
                    status,
                    format!(
                        "({} commits, {} flushes, {} failed)",
                        r.commits, r.flushes, r.failures
                    )
                    .dimmed()
                );
            }
            Err(e) => {
                failed += 1;
                println!("{} {} {}", repo, "failed".red(), e);
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} repository worker(s) failed", failed, outcomes.len());
    }
    Ok(())
}
