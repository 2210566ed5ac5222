//! Exclusion rules for watched repositories
//!
//! Combines three sources of patterns:
//! 1. Built-in rules (`.git/` internals and editor temporaries, always active)
//! 2. `.gitignore` at the repository root (optional, enabled by default)
//! 3. Configured `excludes` globs, using gitignore syntax
//!
//! Matching is a pure predicate over repository-relative paths, see
//! [`is_excluded`].

use anyhow::Result;
use ignore::gitignore::{Gitignore, GitignoreBuilder};
use std::path::{Component, Path, PathBuf};

/// Compiled exclusion rules for one repository
pub struct IgnoreRules {
    /// Repository root directory
    repo_root: PathBuf,

    /// Root `.gitignore` (optional)
    gitignore: Option<Gitignore>,

    /// Configured exclude globs
    excludes: Option<Gitignore>,
}

impl IgnoreRules {
    /// Build rules for `repo_root` from the repository's settings
    pub fn load(repo_root: &Path, parse_gitignore: bool, excludes: &[String]) -> Result<Self> {
        let gitignore = if parse_gitignore {
            let gitignore_path = repo_root.join(".gitignore");
            if gitignore_path.exists() {
                let mut builder = GitignoreBuilder::new(repo_root);
                if let Some(e) = builder.add(&gitignore_path) {
                    tracing::warn!(path = %gitignore_path.display(), "Partially parsed .gitignore: {}", e);
                }
                Some(builder.build()?)
            } else {
                None
            }
        } else {
            None
        };

        let excludes = if excludes.is_empty() {
            None
        } else {
            let mut builder = GitignoreBuilder::new(repo_root);
            for pattern in excludes {
                builder.add_line(None, pattern)?;
            }
            Some(builder.build()?)
        };

        Ok(Self {
            repo_root: repo_root.to_path_buf(),
            gitignore,
            excludes,
        })
    }

    /// Number of active rule sources (built-ins always count)
    pub fn active_sources(&self) -> usize {
        1 + usize::from(self.gitignore.is_some()) + usize::from(self.excludes.is_some())
    }

    pub fn repo_root(&self) -> &Path {
        &self.repo_root
    }
}

/// Pure exclusion predicate
///
/// `rel_path` must be relative to the repository root.
pub fn is_excluded(rel_path: &Path, is_dir: bool, rules: &IgnoreRules) -> bool {
    if rel_path.has_root() {
        return false;
    }
    if is_builtin_ignored(rel_path) {
        return true;
    }

    let matches = |set: &Option<Gitignore>| {
        set.as_ref()
            .map(|gi| gi.matched_path_or_any_parents(rel_path, is_dir).is_ignore())
            .unwrap_or(false)
    };
    matches(&rules.excludes) || matches(&rules.gitignore)
}

fn is_builtin_ignored(rel_path: &Path) -> bool {
    let in_git_dir = rel_path
        .components()
        .any(|c| matches!(c, Component::Normal(name) if name == ".git"));
    if in_git_dir {
        return true;
    }

    let filename = rel_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    is_editor_temp(filename)
}

/// Editor swap/backup files and OS metadata files
fn is_editor_temp(filename: &str) -> bool {
    // Vim swap files
    if filename.ends_with(".swp") || filename.ends_with(".swo") || filename.ends_with(".swx") {
        return true;
    }

    // Vim/Emacs backups
    if filename.ends_with('~') {
        return true;
    }

    // Emacs auto-save (#file#) and lock files (.#file)
    if (filename.len() > 1 && filename.starts_with('#') && filename.ends_with('#'))
        || filename.starts_with(".#")
    {
        return true;
    }

    // 4913 is the scratch file Vim creates to test write permission
    if filename == "4913" {
        return true;
    }

    filename == ".DS_Store" || filename.starts_with("._") || filename == "Thumbs.db"
}
