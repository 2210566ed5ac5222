//! Thin wrapper around the `git` executable

use std::path::Path;
use std::process::{Command, Output};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run `git {args}`: {source}")]
    Spawn {
        args: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`git {args}` failed ({status}): {detail}")]
    Failed {
        args: String,
        status: String,
        detail: String,
    },
}

impl GitError {
    /// Combined stdout/stderr of a failed command
    pub fn detail(&self) -> &str {
        match self {
            GitError::Spawn { .. } => "",
            GitError::Failed { detail, .. } => detail,
        }
    }
}

/// Run git in `dir`, returning stdout on success
pub fn run(dir: &Path, args: &[&str]) -> Result<String, GitError> {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .map_err(|source| GitError::Spawn {
            args: args.join(" "),
            source,
        })?;

    if output.status.success() {
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    } else {
        Err(failed(args, &output))
    }
}

fn failed(args: &[&str], output: &Output) -> GitError {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let detail = [stdout.trim(), stderr.trim()]
        .iter()
        .filter(|s| !s.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join("\n");

    // `git commit -m <message>` would otherwise repeat the whole message
    let shown: Vec<&str> = args.iter().take(2).copied().collect();
    GitError::Failed {
        args: shown.join(" "),
        status: output.status.to_string(),
        detail,
    }
}

/// Whether the git executable can be launched at all
pub fn git_available() -> bool {
    Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

pub fn is_git_repo(path: &Path) -> bool {
    run(path, &["rev-parse", "--is-inside-work-tree"])
        .map(|out| out.trim() == "true")
        .unwrap_or(false)
}

/// Unstaged, staged or untracked (non-ignored) changes present
pub fn has_changes(repo: &Path) -> Result<bool, GitError> {
    let status = run(repo, &["status", "--porcelain", "--untracked-files=all"])?;
    Ok(!status.trim().is_empty())
}

/// Current branch name, empty when detached
pub fn current_branch(repo: &Path) -> String {
    run(repo, &["symbolic-ref", "--quiet", "--short", "HEAD"])
        .map(|out| out.trim().to_string())
        .unwrap_or_default()
}
