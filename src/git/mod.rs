//! git
//!
//! Single interface for all git operations.
//!
//! # Architecture
//!
//! This module is the **ONLY doorway** to git. Every repository read and
//! write flows through the `git` binary launched by [`CommandRunner`];
//! `git2` is used solely to discover the metadata directory and work tree
//! when a handle is opened. No other module launches processes.
//!
//! # Responsibilities
//!
//! - Command construction and launch ([`runner`])
//! - Read-only allow-list and the identity gate ([`safety`])
//! - Error taxonomy ([`error`])
//! - Interrupted-operation detection and cleanup ([`state`])
//! - Strongly-typed convenience calls ([`Git`])
//!
//! # Invariants
//!
//! - `GIT_DIR` and `GIT_WORK_TREE` are set on every invocation
//! - No mutating subcommand runs before the committer identity is verified
//! - A non-zero exit from [`Git::execute`] is always a
//!   [`GitError::CommandFailed`]
//!
//! # Example
//!
//! ```ignore
//! use tracflow::git::{Git, GitCommand, Subcommand};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?.with_verbose(true);
//!
//! if !git.state().is_empty() {
//!     git.reset_to_clean_state()?;
//! }
//! let log = git.execute(&GitCommand::new(Subcommand::Log).value("max_count", 5))?;
//! ```

mod error;
mod interface;
mod runner;
mod safety;
mod state;

pub use error::GitError;
pub use interface::Git;
pub use runner::{CommandResult, CommandRunner, FlagValue, GitCommand, GitFlags, Subcommand};
pub use state::{detect as detect_state, RepoState};
