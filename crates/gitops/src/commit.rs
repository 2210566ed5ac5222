//! Commit (and optionally push) a repository's working tree

use crate::git::{self, GitError};
use crate::message::{render_message, with_trailers};
use chrono::Utc;
use engine::{CommitError, RepoConfig};
use tracing::debug;

/// Stage everything, commit, and push when configured
///
/// Returns `Ok(None)` when the working tree has nothing to commit, otherwise
/// the commit subject. `files` only feeds the message template.
pub fn commit_and_maybe_push(repo: &RepoConfig, files: &[String]) -> Result<Option<String>, CommitError> {
    let dir = repo.path.as_path();

    if !git::has_changes(dir).map_err(commit_error)? {
        debug!(repo = %dir.display(), "Working tree clean");
        return Ok(None);
    }

    git::run(dir, &["add", "-A"]).map_err(commit_error)?;

    let branch = if repo.branch.trim().is_empty() {
        git::current_branch(dir)
    } else {
        repo.branch.clone()
    };
    let subject = render_message(&repo.message, files, &branch, Utc::now());
    let message = with_trailers(subject.clone(), &repo.trailers);

    let mut args: Vec<&str> = vec!["commit", "-m", &message];
    if repo.sign {
        args.push("-S");
    }
    args.extend(repo.sign_args.iter().map(String::as_str));

    if let Err(e) = git::run(dir, &args) {
        if e.detail().contains("nothing to commit") {
            return Ok(None);
        }
        return Err(commit_error(e));
    }

    if repo.push {
        push(repo).map_err(|e| CommitError::PushFailed {
            summary: subject.clone(),
            reason: e.to_string(),
        })?;
    }

    Ok(Some(subject))
}

fn push(repo: &RepoConfig) -> Result<(), GitError> {
    let remote = if repo.remote.trim().is_empty() {
        "origin"
    } else {
        repo.remote.as_str()
    };
    let refspec = format!("HEAD:{}", repo.branch.trim());

    let mut args = vec!["push", remote];
    if !repo.branch.trim().is_empty() {
        args.push(&refspec);
    }
    git::run(&repo.path, &args).map(|_| ())
}

fn commit_error(e: GitError) -> CommitError {
    CommitError::Commit(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    /// Fresh repository with an identity, or None when git is unavailable
    fn init_repo() -> Option<TempDir> {
        if !git::git_available() {
            return None;
        }
        let dir = TempDir::new().unwrap();
        for args in [
            &["init", "-q"][..],
            &["config", "user.email", "autosave@example.com"],
            &["config", "user.name", "Autosave"],
            &["config", "commit.gpgsign", "false"],
        ] {
            git::run(dir.path(), args).unwrap();
        }
        Some(dir)
    }

    fn config_for(dir: &Path) -> RepoConfig {
        let mut repo = RepoConfig::with_defaults(dir);
        repo.message = "autosave {count} {file}".to_string();
        repo
    }

    fn head_message(dir: &Path) -> String {
        git::run(dir, &["log", "-1", "--format=%B"]).unwrap().trim().to_string()
    }

    #[test]
    fn test_clean_tree_is_a_no_op() {
        let Some(dir) = init_repo() else { return };
        let result = commit_and_maybe_push(&config_for(dir.path()), &[]).unwrap();
        assert_eq!(result, None);
    }

    #[test]
    fn test_commits_all_changes_with_trailers() {
        let Some(dir) = init_repo() else { return };
        fs::create_dir_all(dir.path().join("notes")).unwrap();
        fs::write(dir.path().join("notes/today.md"), "# Today\n").unwrap();
        fs::write(dir.path().join("untracked.txt"), "x").unwrap();

        let mut repo = config_for(dir.path());
        repo.trailers.insert("Auto-Commit".into(), "true".into());

        let summary = commit_and_maybe_push(&repo, &["notes/today.md".to_string()]).unwrap();

        assert_eq!(summary.as_deref(), Some("autosave 1 today.md"));
        assert_eq!(head_message(dir.path()), "autosave 1 today.md\n\nAuto-Commit: true");
        assert!(!git::has_changes(dir.path()).unwrap());
    }

    #[test]
    fn test_path_list_is_advisory() {
        let Some(dir) = init_repo() else { return };
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        // An interval flush hands over no paths; the tree still gets committed.
        let summary = commit_and_maybe_push(&config_for(dir.path()), &[]).unwrap();
        assert_eq!(summary.as_deref(), Some("autosave 0 "));
        assert!(!git::has_changes(dir.path()).unwrap());
    }

    #[test]
    fn test_push_to_branch_on_remote() {
        let Some(dir) = init_repo() else { return };
        let remote = TempDir::new().unwrap();
        git::run(remote.path(), &["init", "-q", "--bare"]).unwrap();
        let remote_url = remote.path().to_string_lossy().into_owned();
        git::run(dir.path(), &["remote", "add", "origin", &remote_url]).unwrap();

        fs::write(dir.path().join("a.txt"), "a").unwrap();
        let mut repo = config_for(dir.path());
        repo.push = true;
        repo.branch = "autosave".to_string();

        commit_and_maybe_push(&repo, &["a.txt".to_string()]).unwrap();

        let pushed = git::run(remote.path(), &["log", "-1", "--format=%s", "autosave"]).unwrap();
        assert_eq!(pushed.trim(), "autosave 1 a.txt");
    }

    #[test]
    fn test_push_failure_keeps_commit() {
        let Some(dir) = init_repo() else { return };
        fs::write(dir.path().join("a.txt"), "a").unwrap();

        let mut repo = config_for(dir.path());
        repo.push = true;
        repo.remote = "nowhere".to_string();
        repo.branch = "main".to_string();

        let err = commit_and_maybe_push(&repo, &["a.txt".to_string()]).unwrap_err();

        match err {
            CommitError::PushFailed { summary, .. } => assert_eq!(summary, "autosave 1 a.txt"),
            other => panic!("expected push failure, got {other:?}"),
        }
        assert_eq!(head_message(dir.path()), "autosave 1 a.txt");
    }
}
