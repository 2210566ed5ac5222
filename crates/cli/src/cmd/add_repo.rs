//! Register a repository in the config file

use crate::system_config;
use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use std::path::Path;

pub async fn run(config_path: Option<&Path>, repo: &Path) -> Result<()> {
    let repo = repo
        .canonicalize()
        .with_context(|| format!("Repository path {} does not exist", repo.display()))?;
    if !repo.is_dir() {
        anyhow::bail!("{} is not a directory", repo.display());
    }

    let path = system_config::resolve_path(config_path)?;
    let mut config = system_config::load_from(&path)?;

    if !system_config::add_repo(&mut config, repo.clone()) {
        println!("{} {} is already configured", "·".dimmed(), repo.display());
        return Ok(());
    }
    config.validate().context("Invalid configuration")?;
    system_config::save_to(&path, &config)?;

    println!("{} Added {}", "✓".green(), repo.display().cyan());
    println!("{}: {}", "Config".dimmed(), path.display().dimmed());
    if !gitops::is_git_repo(&repo) {
        println!(
            "{}",
            "Warning: not a git work tree yet, run `git init` before starting".yellow()
        );
    }

    Ok(())
}
