//! System-wide configuration file
//!
//! Location: `$AUTOCOMMIT_CONFIG` when set, otherwise
//! `<config dir>/autocommit/config.toml` (e.g. `~/.config/autocommit/` on Linux).
//! A missing file is an empty configuration.

use anyhow::{Context, Result};
use engine::{Config, RepoConfig};
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the config file location
pub const CONFIG_ENV: &str = "AUTOCOMMIT_CONFIG";

/// Path of the active config file
pub fn config_file_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join("autocommit").join("config.toml"))
}

/// Explicit path when given, otherwise the default location
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    match explicit {
        Some(path) => Ok(path.to_path_buf()),
        None => config_file_path().context("Could not determine config file path"),
    }
}

/// Load the config file, falling back to an empty config when absent
pub fn load_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No config file, using empty config");
        return Ok(Config::default());
    }

    let contents = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: Config = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    Ok(config)
}

pub fn save_to(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }

    let contents = toml::to_string_pretty(config).context("Failed to serialize config")?;
    fs::write(path, contents)
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(())
}

/// Write the example config if no config file exists yet
///
/// Returns whether a file was created.
pub fn init_if_missing(explicit: Option<&Path>) -> Result<bool> {
    let path = resolve_path(explicit)?;
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create config directory {}", parent.display()))?;
    }
    fs::write(&path, example_config())
        .with_context(|| format!("Failed to write config file {}", path.display()))?;
    Ok(true)
}

/// Add a repository with default settings
///
/// Returns false when the path is already configured.
pub fn add_repo(config: &mut Config, path: PathBuf) -> bool {
    if config.repos.iter().any(|r| r.path == path) {
        return false;
    }
    config.repos.push(RepoConfig::with_defaults(path));
    true
}

/// Example configuration with documented defaults
pub fn example_config() -> &'static str {
    r#"# autocommit configuration

# Directory for daily rolling log files (stdout only when unset)
# log_dir = "/var/log/autocommit"

[[repos]]
path = "/home/me/notes"

# React to filesystem changes
watch = true

# Commit on a fixed cadence as well (0 disables)
interval_secs = 0

# Per-path debounce for filesystem notifications
debounce_ms = 1200

# Longest a burst of changes may accumulate before committing (0 disables)
batch_window_ms = 45000

# Quiet period after the last change before committing (0 disables)
idle_window_ms = 5000

# Push after every commit
push = false
remote = "origin"
# Empty means the current branch
branch = ""

# Placeholders: {iso} {unix} {branch} {file} {count}
message = "autosave: {iso}"

# Gitignore-style globs, matched relative to the repository root
excludes = ["**/node_modules/**"]
parse_gitignore = true

# GPG signing (-S) plus extra arguments for `git commit`
sign = false
sign_args = []

# Appended to every commit message as "Key: value" lines
[repos.trailers]
# Auto-Commit = "true"
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn test_example_config_parses_to_defaults() {
        let config: Config = toml::from_str(example_config()).unwrap();

        assert_eq!(config.log_dir, None);
        assert_eq!(config.repos.len(), 1);
        assert_eq!(config.repos[0], RepoConfig::with_defaults("/home/me/notes"));
        config.validate().unwrap();
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let temp_dir = TempDir::new().unwrap();
        let config = load_from(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_save_then_load() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested/config.toml");

        let mut repo = RepoConfig::with_defaults("/srv/wiki");
        repo.interval = Duration::from_secs(600);
        repo.push = true;
        repo.trailers.insert("Auto-Commit".into(), "true".into());
        let config = Config {
            log_dir: Some(temp_dir.path().join("logs")),
            repos: vec![repo],
        };

        save_to(&path, &config).unwrap();
        let saved = fs::read_to_string(&path).unwrap();
        assert!(saved.contains("interval_secs = 600"));

        assert_eq!(load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_parse_error_names_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "[[repos]]\nwatch = \"yes\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("config.toml"));
    }

    #[test]
    fn test_init_if_missing_writes_example_once() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("autocommit/config.toml");

        assert!(init_if_missing(Some(&path)).unwrap());
        assert_eq!(fs::read_to_string(&path).unwrap(), example_config());

        fs::write(&path, "log_dir = \"/tmp\"\n").unwrap();
        assert!(!init_if_missing(Some(&path)).unwrap());
        assert_eq!(load_from(&path).unwrap().log_dir, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_add_repo_skips_duplicates() {
        let mut config = Config::default();
        assert!(add_repo(&mut config, PathBuf::from("/a")));
        assert!(!add_repo(&mut config, PathBuf::from("/a")));
        assert!(add_repo(&mut config, PathBuf::from("/b")));
        assert_eq!(config.repos.len(), 2);
    }
}
