//! Common utilities for integration tests

pub mod cli;

use std::path::Path;
use std::process::Command;

/// Initialise a git repository with a local identity
///
/// Returns false when git is not installed.
pub fn init_git_repo(dir: &Path) -> bool {
    let git = |args: &[&str]| {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .map(|o| o.status.success())
            .unwrap_or(false)
    };
    git(&["init", "-q"])
        && git(&["config", "user.email", "autosave@example.com"])
        && git(&["config", "user.name", "Autosave"])
        && git(&["config", "commit.gpgsign", "false"])
}

/// Subjects of all commits on HEAD, newest first
pub fn commit_subjects(dir: &Path) -> Vec<String> {
    Command::new("git")
        .args(["log", "--format=%s"])
        .current_dir(dir)
        .output()
        .map(|o| {
            String::from_utf8_lossy(&o.stdout)
                .lines()
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
