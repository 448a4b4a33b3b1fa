//! git::error
//!
//! Typed failure categories for everything that goes through the git doorway.
//!
//! Two groups:
//!
//! - Expected failures a caller may act on: [`GitError::CommandFailed`]
//!   (inspect the exit code and streams), [`GitError::DetachedHead`] (offer a
//!   checkout).
//! - Assertion-like failures that propagate to the top level unchanged:
//!   [`GitError::MissingIdentity`], [`GitError::UnparsableBranchName`],
//!   [`GitError::UnknownStatusCode`], [`GitError::UnsupportedRepositoryState`].
//!
//! None of these are retried automatically.

use std::path::PathBuf;

use thiserror::Error;

use super::runner::CommandResult;
use super::state::RepoState;
use crate::core::types::TypeError;

/// Errors from git operations.
#[derive(Debug, Error)]
pub enum GitError {
    /// Not inside a git repository.
    #[error("not a git repository: {path}")]
    NotARepo {
        /// The path that was searched
        path: PathBuf,
    },

    /// Repository is bare (no work tree).
    #[error("bare repository not supported")]
    BareRepo,

    /// The git executable could not be launched at all.
    #[error("failed to launch \"{cmd}\": {source}")]
    Spawn {
        cmd: String,
        source: std::io::Error,
    },

    /// git exited with a non-zero code.
    #[error(
        "git returned with non-zero exit code ({exit_code}) when executing \"{cmd}\"{}",
        tagged_streams(.stdout, .stderr)
    )]
    CommandFailed {
        exit_code: i32,
        cmd: String,
        stdout: String,
        stderr: String,
    },

    /// HEAD does not point at a branch.
    #[error("unexpectedly, git is in a detached HEAD state")]
    DetachedHead,

    /// `user.name` or `user.email` is not configured.
    #[error("user/email is not configured, cannot make commits")]
    MissingIdentity,

    /// A ref name fell outside the managed naming grammar.
    #[error("cannot parse branch name {name:?}: {reason}")]
    UnparsableBranchName { name: String, reason: String },

    /// A porcelain status pair outside the modeled cases.
    #[error("unknown status {status:?} for {path:?}")]
    UnknownStatusCode { status: String, path: String },

    /// The repository is in a state this layer deliberately does not unwind.
    #[error("cannot leave {state} state automatically")]
    UnsupportedRepositoryState { state: RepoState },

    /// An abort command succeeded but the state it should clear is still there.
    #[error("{state} state persists after abort")]
    StateNotCleared { state: RepoState },

    /// Command output did not match the expected machine-readable format.
    #[error("unexpected output from git {command}: {detail}")]
    UnexpectedOutput { command: String, detail: String },

    /// Object name failed validation.
    #[error("{0}")]
    InvalidSha1(String),

    /// A text diff was requested for an entry that has none.
    #[error("cannot diff {path:?}: {reason}")]
    NotDiffable { path: String, reason: String },

    /// Invalid combination of arguments.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl GitError {
    /// Build a `CommandFailed` error from a finished invocation.
    pub fn command_failed(result: CommandResult) -> Self {
        GitError::CommandFailed {
            exit_code: result.exit_code,
            cmd: result.cmd,
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }

    /// Exit code of a failed command, if this is one.
    pub fn exit_code(&self) -> Option<i32> {
        match self {
            GitError::CommandFailed { exit_code, .. } => Some(*exit_code),
            _ => None,
        }
    }
}

impl From<TypeError> for GitError {
    fn from(err: TypeError) -> Self {
        match err {
            TypeError::InvalidSha1(msg) => GitError::InvalidSha1(msg),
        }
    }
}

/// Render both output streams with a tag in front of every line.
fn tagged_streams(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    for (tag, text) in [("STDOUT", stdout), ("STDERR", stderr)] {
        for line in text.lines() {
            out.push_str("\n    ");
            out.push_str(tag);
            out.push_str(": ");
            out.push_str(line);
        }
    }
    out
}
