//! cli
//!
//! Command-line interface layer for tracflow.
//!
//! # Responsibilities
//!
//! - Parse command-line arguments and global flags
//! - Install the log subscriber
//! - Load configuration and open the repository
//! - Delegate to command handlers
//!
//! # Architecture
//!
//! The CLI layer is thin. It parses arguments via clap and calls the
//! [`crate::repository::Repository`] façade; it never builds git commands
//! for queries the façade already answers.

pub mod args;
pub mod commands;

pub use args::{Cli, Shell};

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use tracing_subscriber::EnvFilter;

use crate::core::config::Config;
use crate::git::Git;
use crate::repository::Repository;
use crate::ui::output::Verbosity;

/// Execution context shared by all command handlers.
#[derive(Debug, Clone, Default)]
pub struct Context {
    /// Directory to run in (default: current directory)
    pub cwd: Option<PathBuf>,
    /// Debug logging requested
    pub debug: bool,
    /// Minimal output requested
    pub quiet: bool,
}

impl Context {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.debug)
    }

    /// Open the repository containing the working directory, with
    /// configuration applied.
    pub fn open_repository(&self) -> Result<Repository> {
        let cwd = match &self.cwd {
            Some(path) => path.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };
        let git = Git::open(&cwd).context("Failed to open repository")?;

        let config =
            Config::load(Some(git.git_dir())).context("Failed to load configuration")?;

        let git = git
            .with_git_cmd(config.git_cmd())
            .with_verbose(self.debug || config.verbose());
        Ok(Repository::new(git, config.repo_settings()))
    }
}

/// Install the global log subscriber, writing to stderr.
///
/// `RUST_LOG` wins over `--debug`.
fn init_logging(debug: bool) {
    let default = if debug { "tracflow=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Run the CLI application.
///
/// This is the main entry point called from `main.rs`.
pub fn run() -> Result<()> {
    let cli = Cli::parse_args();
    init_logging(cli.debug);

    let ctx = Context {
        cwd: cli.cwd.clone(),
        debug: cli.debug,
        quiet: cli.quiet,
    };

    commands::dispatch(cli.command, &ctx)
}
