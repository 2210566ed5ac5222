//! autocommit - commit (and push) working trees as they change

use anyhow::Result;
use clap::{Parser, Subcommand};
use cli_lib::{cmd, logging};
use std::path::PathBuf;

/// autocommit - Watch repositories and commit changes automatically
#[derive(Parser)]
#[command(name = "autocommit")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Config file (default: $AUTOCOMMIT_CONFIG or the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Watch all configured repositories until interrupted
    Run {
        /// Only run these repositories (repeatable)
        #[arg(long = "repo")]
        repos: Vec<PathBuf>,
    },
    /// Add a repository to the config with default settings
    AddRepo {
        /// Repository working directory
        path: PathBuf,
    },
    /// Check that every configured repository can be committed to
    Check,
    /// Inspect the configuration
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// List configured repositories and their settings
    List,
    /// Show the config file path
    Path {
        /// Create the file from the example if it does not exist
        #[arg(long)]
        create: bool,
    },
    /// Print an example configuration
    Example,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config.as_deref();

    // `run` installs its own subscriber once the log directory is known
    if !matches!(cli.command, Commands::Run { .. }) {
        logging::init_quiet();
    }

    match cli.command {
        Commands::Run { repos } => cmd::run::run(config, &repos).await,
        Commands::AddRepo { path } => cmd::add_repo::run(config, &path).await,
        Commands::Check => cmd::check::run(config).await,
        Commands::Config(ConfigCommands::List) => cmd::config::run_list(config).await,
        Commands::Config(ConfigCommands::Path { create }) => cmd::config::run_path(config, create).await,
        Commands::Config(ConfigCommands::Example) => cmd::config::run_example().await,
    }
}
