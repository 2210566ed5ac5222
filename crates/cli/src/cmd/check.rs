//! Verify every configured repository can be driven

use crate::system_config;
use anyhow::{Context, Result};
use engine::{CommitBackend, RepoConfig};
use gitops::GitBackend;
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>) -> Result<()> {
    let path = system_config::resolve_path(config_path)?;
    let config = system_config::load_from(&path)?;

    println!("{}: {}", "Config".dimmed(), path.display());
    config.validate().context("Invalid configuration")?;

    if config.repos.is_empty() {
        println!("{}", "No repositories configured".yellow());
        return Ok(());
    }

    let mut problems = 0;
    for repo in &config.repos {
        match GitBackend.check(repo) {
            Ok(()) => println!("{} {} {}", "✓".green(), repo.path.display(), describe(repo).dimmed()),
            Err(e) => {
                problems += 1;
                println!("{} {} {}", "✗".red(), repo.path.display(), e);
            }
        }
    }

    if problems > 0 {
        anyhow::bail!("{} repository(ies) cannot be committed to", problems);
    }
    Ok(())
}

/// One-line summary of a repository's triggers
fn describe(repo: &RepoConfig) -> String {
    let mut parts = Vec::new();
    if repo.watch {
        parts.push("watch".to_string());
    }
    if let Some(every) = repo.interval() {
        parts.push(format!("every {}s", every.as_secs()));
    }

    let branch = if repo.branch.is_empty() {
        gitops::current_branch(&repo.path)
    } else {
        repo.branch.clone()
    };
    if repo.push {
        parts.push(format!("push {}/{}", repo.remote, branch));
    } else if !branch.is_empty() {
        parts.push(format!("on {}", branch));
    }

    format!("({})", parts.join(", "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_describe_triggers() {
        let mut repo = RepoConfig::with_defaults("/nonexistent/repo");
        repo.interval = Duration::from_secs(300);
        repo.push = true;
        repo.branch = "autosave".into();

        assert_eq!(describe(&repo), "(watch, every 300s, push origin/autosave)");

        repo.watch = false;
        repo.push = false;
        assert_eq!(describe(&repo), "(every 300s, on autosave)");
    }
}
