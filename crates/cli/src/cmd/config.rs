//! Configuration inspection commands

use crate::system_config;
use anyhow::Result;
use engine::RepoConfig;
use owo_colors::OwoColorize;
use std::path::Path;

/// Show every configured repository with its effective settings
pub async fn run_list(config_path: Option<&Path>) -> Result<()> {
    let path = system_config::resolve_path(config_path)?;
    let config = system_config::load_from(&path)?;

    println!("{}", "autocommit configuration".bold());
    println!("{}: {}", "Location".dimmed(), path.display().dimmed());
    match &config.log_dir {
        Some(dir) => println!("{}: {}\n", "Logs".dimmed(), dir.display()),
        None => println!("{}: {}\n", "Logs".dimmed(), "stdout only".dimmed()),
    }

    if config.repos.is_empty() {
        println!("{}", "No repositories configured".yellow());
        return Ok(());
    }

    for repo in &config.repos {
        print_repo(repo);
    }

    if let Err(e) = config.validate() {
        println!("{} {}", "Invalid:".red().bold(), e);
    }
    Ok(())
}

fn print_repo(repo: &RepoConfig) {
    println!("{}", format!("[{}]", repo.path.display()).yellow());
    println!("  {} = {}", "watch".cyan(), repo.watch);
    println!(
        "  {} = {} {}",
        "interval_secs".cyan(),
        repo.interval.as_secs(),
        if repo.interval().is_none() { "(disabled)".dimmed().to_string() } else { String::new() }
    );
    println!("  {} = {}", "debounce_ms".cyan(), repo.debounce.as_millis());
    println!("  {} = {}", "batch_window_ms".cyan(), repo.batch_window.as_millis());
    println!("  {} = {}", "idle_window_ms".cyan(), repo.idle_window.as_millis());
    println!("  {} = {}", "push".cyan(), repo.push);
    if repo.push {
        println!("  {} = {}", "remote".cyan(), repo.remote);
        println!(
            "  {} = {}",
            "branch".cyan(),
            if repo.branch.is_empty() { "(current)" } else { repo.branch.as_str() }
        );
    }
    println!("  {} = {:?}", "message".cyan(), repo.message);
    println!("  {} = {:?}", "excludes".cyan(), repo.excludes);
    println!("  {} = {}", "parse_gitignore".cyan(), repo.parse_gitignore);
    if repo.sign || !repo.sign_args.is_empty() {
        println!("  {} = {} {:?}", "sign".cyan(), repo.sign, repo.sign_args);
    }
    for (key, value) in &repo.trailers {
        println!("  {} {}: {}", "trailer".cyan(), key, value);
    }
    println!();
}

/// Show the config file path and optionally create it
pub async fn run_path(config_path: Option<&Path>, create: bool) -> Result<()> {
    let path = system_config::resolve_path(config_path)?;

    if create && system_config::init_if_missing(Some(&path))? {
        println!("{} Created config file at: {}", "✓".green(), path.display());
    } else if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{}", path.display());
        println!("{}", "File does not exist. Use --create to create it.".yellow());
    }

    Ok(())
}

/// Show example configuration
pub async fn run_example() -> Result<()> {
    print!("{}", system_config::example_config());
    Ok(())
}
