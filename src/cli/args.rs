//! cli::args
//!
//! Command-line argument definitions using clap derive.
//!
//! # Global Flags
//!
//! These flags are available on all commands:
//! - `--help` / `-h`: Show help
//! - `--version`: Show version
//! - `--cwd <path>`: Run as if in that directory
//! - `--debug`: Log every git invocation
//! - `--quiet` / `-q`: Minimal output

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// tracflow - ticket branches and change lists over git
#[derive(Parser, Debug)]
#[command(name = "tf")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Run as if tf was started in this directory
    #[arg(long, global = true)]
    pub cwd: Option<PathBuf>,

    /// Enable debug logging, including every git invocation
    #[arg(long, global = true)]
    pub debug: bool,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Parser::parse()
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List files changed since a base commit
    #[command(
        name = "changes",
        long_about = "List every file changed since the base commit.\n\n\
            History and live status are merged into one list: a file that was \
            committed since the base and is also modified right now is shown once, \
            as staged or unstaged. Untracked files are included.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Changes since HEAD (uncommitted work only)
    tf changes

    # Everything done on this branch since master
    tf changes --base master

    # Machine-readable output
    tf changes --base HEAD~3 --json

READING THE OUTPUT:
    diff:+3-1:src/lib.rs       <- committed since the base
    unstaged:+2-0:README       <- modified in the work tree
    staged:+0-0:new_file       <- changes in the index
    untracked:scratch.txt      <- not tracked by git"
    )]
    Changes {
        /// Base revision (default: HEAD)
        #[arg(long, value_name = "REV")]
        base: Option<String>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List local branches, oldest first
    Branches {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the checked-out branch
    Current,

    /// Check out a branch, fetching it from the ticket remote if missing
    #[command(
        name = "checkout",
        long_about = "Check out a branch.\n\n\
            Names containing '/' are ticket branches: 'u/bob/work' with \
            '--ticket 1001' becomes '<prefix>1001/u/bob/work' locally. If the \
            branch does not exist yet it is fetched from the configured remote.",
        after_help = "\
WORKFLOW EXAMPLES:
    # Work on a ticket branch
    tf checkout u/bob/work --ticket 1001

    # A ticket branch without a ticket number
    tf checkout u/bob/experiment

    # A plain local branch
    tf checkout master"
    )]
    Checkout {
        /// Branch name, or remote branch name for ticket branches
        name: String,

        /// Ticket number
        #[arg(long, short)]
        ticket: Option<u64>,
    },

    /// Show the commits of a branch since the baseline
    History {
        /// Branch name (default: current branch)
        branch: Option<String>,
    },

    /// Show interrupted git operations
    State,

    /// Abort interrupted git operations until the repository is clean
    Abort,

    /// Discard uncommitted changes to tracked files
    Clean {
        /// Also remove untracked files
        #[arg(short = 'u', long)]
        untracked: bool,

        /// Also remove untracked directories (requires -u)
        #[arg(short = 'd', long, requires = "untracked")]
        directories: bool,

        /// Also remove ignored files (requires -u)
        #[arg(short = 'x', long, requires = "untracked")]
        ignored: bool,
    },

    /// Generate shell completion scripts
    #[command(
        name = "completion",
        after_help = "\
INSTALLATION:
    # Bash
    tf completion bash > ~/.local/share/bash-completion/completions/tf

    # Zsh
    tf completion zsh > ~/.zfunc/_tf

    # Fish
    tf completion fish > ~/.config/fish/completions/tf.fish

    # PowerShell
    tf completion powershell >> $PROFILE"
    )]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Supported shells for completion
#[derive(clap::ValueEnum, Debug, Clone, Copy)]
#[allow(clippy::enum_variant_names)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
}
