//! Helpers for running the `autocommit` binary
//!
//! Every command is pointed at an explicit config file so tests never touch
//! the user's real configuration.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

/// CLI command builder
pub struct AutocommitCommand {
    config: PathBuf,
    working_dir: PathBuf,
    args: Vec<String>,
}

impl AutocommitCommand {
    pub fn new(config: impl AsRef<Path>) -> Self {
        let config = config.as_ref().to_path_buf();
        let working_dir = existing_ancestor(&config);
        Self {
            config,
            working_dir,
            args: Vec::new(),
        }
    }

    pub fn args(&mut self, args: &[&str]) -> &mut Self {
        self.args.extend(args.iter().map(|s| s.to_string()));
        self
    }

    fn command(&self) -> Command {
        let mut command = Command::new(env!("CARGO_BIN_EXE_autocommit"));
        command
            .arg("--config")
            .arg(&self.config)
            .args(&self.args)
            .current_dir(&self.working_dir)
            .env_remove("AUTOCOMMIT_CONFIG");
        command
    }

    /// Execute command and capture its output
    pub fn execute(&self) -> Result<CommandResult> {
        let output = self
            .command()
            .output()
            .context("Failed to execute command")?;

        Ok(CommandResult {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            exit_code: output.status.code().unwrap_or(-1),
        })
    }

    /// Start a long-running command (`run`) with captured output
    pub fn spawn(&self) -> Result<Child> {
        self.command()
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .context("Failed to spawn command")
    }

    /// Execute and assert success
    pub fn assert_success(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if !result.success() {
            anyhow::bail!(
                "Command failed (exit code: {}):\nArgs: {:?}\nStdout: {}\nStderr: {}",
                result.exit_code,
                self.args,
                result.stdout,
                result.stderr
            );
        }

        Ok(result)
    }

    /// Execute and expect failure
    pub fn assert_failure(&self) -> Result<CommandResult> {
        let result = self.execute()?;

        if result.success() {
            anyhow::bail!(
                "Command should have failed but succeeded:\nArgs: {:?}\nStdout: {}",
                self.args,
                result.stdout
            );
        }

        Ok(result)
    }
}

/// Command execution result
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub stdout: String,
    pub stderr: String,
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    pub fn contains_stdout(&self, text: &str) -> bool {
        self.stdout.contains(text)
    }

    pub fn contains_stderr(&self, text: &str) -> bool {
        self.stderr.contains(text)
    }
}

/// Closest existing directory above `path`
///
/// The config file (and its directory) may not exist yet.
fn existing_ancestor(path: &Path) -> PathBuf {
    path.ancestors()
        .skip(1)
        .find(|dir| dir.is_dir())
        .map(Path::to_path_buf)
        .unwrap_or_else(std::env::temp_dir)
}

/// Usage:
/// ```ignore
/// autocommit!(config_path, "config", "list").assert_success()?;
/// ```
#[macro_export]
macro_rules! autocommit {
    ($config:expr, $($arg:expr),*) => {{
        let mut cmd = $crate::common::cli::AutocommitCommand::new($config);
        cmd.args(&[$($arg),*]);
        cmd
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_working_dir_skips_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let config = temp_dir.path().join("nested/deeper/config.toml");

        assert_eq!(existing_ancestor(&config), temp_dir.path());
        assert_eq!(AutocommitCommand::new(&config).working_dir, temp_dir.path());
    }
}
