//! Repository configuration
//!
//! Each watched repository carries its own timing windows and commit
//! options. The engine treats a `RepoConfig` as immutable for the lifetime
//! of one scheduler run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Configuration errors surfaced before any scheduler starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("repository path is empty")]
    EmptyPath,

    #[error("repository {0} has watching disabled and no interval; it would never commit")]
    NoActiveInput(PathBuf),

    #[error("repository {0} is configured more than once")]
    DuplicateRepo(PathBuf),

    #[error("repository {path}: {field} exceeds the maximum of {} days", MAX_DURATION.as_secs() / 86_400)]
    DurationTooLarge { path: PathBuf, field: &'static str },
}

/// Upper bound for every configured duration
pub const MAX_DURATION: Duration = Duration::from_secs(366 * 86_400);

/// Per-repository settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoConfig {
    /// Working directory to watch and commit in
    pub path: PathBuf,

    /// React to filesystem changes (default: true)
    #[serde(default = "default_true")]
    pub watch: bool,

    /// Fixed commit cadence, zero disables it
    #[serde(rename = "interval_secs", with = "secs", default)]
    pub interval: Duration,

    /// Per-path debounce applied by the watch source
    #[serde(rename = "debounce_ms", with = "millis", default = "default_debounce")]
    pub debounce: Duration,

    /// Maximum time a burst may accumulate, zero disables it
    #[serde(rename = "batch_window_ms", with = "millis", default = "default_batch_window")]
    pub batch_window: Duration,

    /// Quiet period after the last change, zero disables it
    #[serde(rename = "idle_window_ms", with = "millis", default = "default_idle_window")]
    pub idle_window: Duration,

    #[serde(default)]
    pub push: bool,

    #[serde(default = "default_remote")]
    pub remote: String,

    /// Branch to push to (empty: current branch)
    #[serde(default)]
    pub branch: String,

    /// Commit message template, see `gitops::render_message`
    #[serde(default = "default_message")]
    pub message: String,

    /// Gitignore-style exclude globs
    #[serde(default = "default_excludes")]
    pub excludes: Vec<String>,

    #[serde(default = "default_true")]
    pub parse_gitignore: bool,

    #[serde(default)]
    pub sign: bool,

    #[serde(default)]
    pub sign_args: Vec<String>,

    /// Commit trailers, emitted in key order
    #[serde(default)]
    pub trailers: BTreeMap<String, String>,
}

impl RepoConfig {
    /// Defaults for a freshly added repository
    pub fn with_defaults(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            watch: true,
            interval: Duration::ZERO,
            debounce: default_debounce(),
            batch_window: default_batch_window(),
            idle_window: default_idle_window(),
            push: false,
            remote: default_remote(),
            branch: String::new(),
            message: default_message(),
            excludes: default_excludes(),
            parse_gitignore: true,
            sign: false,
            sign_args: Vec::new(),
            trailers: BTreeMap::new(),
        }
    }

    pub fn interval(&self) -> Option<Duration> {
        non_zero(self.interval)
    }

    pub fn batch_window(&self) -> Option<Duration> {
        non_zero(self.batch_window)
    }

    pub fn idle_window(&self) -> Option<Duration> {
        non_zero(self.idle_window)
    }

    /// Short label used in logs and thread names
    pub fn label(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyPath);
        }
        if !self.watch && self.interval().is_none() {
            return Err(ConfigError::NoActiveInput(self.path.clone()));
        }

        let durations = [
            ("interval_secs", self.interval),
            ("debounce_ms", self.debounce),
            ("batch_window_ms", self.batch_window),
            ("idle_window_ms", self.idle_window),
        ];
        if let Some((field, _)) = durations.iter().find(|(_, d)| *d > MAX_DURATION) {
            return Err(ConfigError::DurationTooLarge {
                path: self.path.clone(),
                field,
            });
        }
        Ok(())
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Directory for the rolling log file (stdout only when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_dir: Option<PathBuf>,

    #[serde(default)]
    pub repos: Vec<RepoConfig>,
}

impl Config {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for repo in &self.repos {
            repo.validate()?;
            if !seen.insert(&repo.path) {
                return Err(ConfigError::DuplicateRepo(repo.path.clone()));
            }
        }
        Ok(())
    }
}

fn non_zero(d: Duration) -> Option<Duration> {
    (!d.is_zero()).then_some(d)
}

fn default_true() -> bool {
    true
}

fn default_debounce() -> Duration {
    Duration::from_millis(1200)
}

fn default_batch_window() -> Duration {
    Duration::from_secs(45)
}

fn default_idle_window() -> Duration {
    Duration::from_secs(5)
}

fn default_remote() -> String {
    "origin".to_string()
}

fn default_message() -> String {
    "autosave: {iso}".to_string()
}

fn default_excludes() -> Vec<String> {
    vec!["**/node_modules/**".to_string()]
}

mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_secs)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}
