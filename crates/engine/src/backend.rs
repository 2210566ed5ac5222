//! Commit backend interface
//!
//! The engine decides *when* to commit; a backend decides *how*. The path
//! list handed to `commit` is advisory (used for message templating). A
//! backend inspects the working tree itself to decide whether anything is
//! committable.

use crate::config::RepoConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CommitError {
    /// The repository cannot be committed to at all
    #[error("not a usable repository: {0}")]
    Unusable(String),

    /// The commit itself failed
    #[error("commit failed: {0}")]
    Commit(String),

    /// The commit was created but pushing it failed
    #[error("committed `{summary}` but push failed: {reason}")]
    PushFailed { summary: String, reason: String },
}

/// Performs the version-control write for one repository
///
/// `commit` runs synchronously on the calling scheduler's thread, so at most
/// one commit is in flight per repository.
pub trait CommitBackend: Send + Sync {
    /// Pre-flight check run once before a repository's scheduler starts
    fn check(&self, _repo: &RepoConfig) -> Result<(), CommitError> {
        Ok(())
    }

    /// Commit the working tree
    ///
    /// Returns `Ok(None)` when there was nothing to commit, otherwise the
    /// commit summary.
    fn commit(&self, repo: &RepoConfig, paths: &[String]) -> Result<Option<String>, CommitError>;
}
