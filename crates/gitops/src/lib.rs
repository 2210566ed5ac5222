//! Git commit backend
//!
//! This crate provides:
//! - `git` process helpers (repository detection, status, branch)
//! - Commit message templating and trailers
//! - Commit-and-push as an [`engine::CommitBackend`]

pub mod commit;
pub mod git;
pub mod message;

pub use commit::commit_and_maybe_push;
pub use git::{current_branch, git_available, has_changes, is_git_repo, GitError};
pub use message::{render_message, with_trailers};

use engine::{CommitBackend, CommitError, RepoConfig};

/// Commit backend driving the `git` executable
#[derive(Debug, Default, Clone, Copy)]
pub struct GitBackend;

impl CommitBackend for GitBackend {
    fn check(&self, repo: &RepoConfig) -> Result<(), CommitError> {
        if !git_available() {
            return Err(CommitError::Unusable("git executable not found".into()));
        }
        if !is_git_repo(&repo.path) {
            return Err(CommitError::Unusable(format!(
                "{} is not a git work tree",
                repo.path.display()
            )));
        }
        Ok(())
    }

    fn commit(&self, repo: &RepoConfig, paths: &[String]) -> Result<Option<String>, CommitError> {
        commit_and_maybe_push(repo, paths)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_check_rejects_plain_directory() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        let repo = RepoConfig::with_defaults(dir.path());

        assert!(matches!(GitBackend.check(&repo), Err(CommitError::Unusable(_))));
    }

    #[test]
    fn test_check_accepts_work_tree() {
        if !git_available() {
            return;
        }
        let dir = TempDir::new().unwrap();
        git::run(dir.path(), &["init", "-q"]).unwrap();

        assert!(GitBackend.check(&RepoConfig::with_defaults(dir.path())).is_ok());
    }
}
