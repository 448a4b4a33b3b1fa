//! git::safety
//!
//! Read-only vs. mutating subcommands, and the committer-identity gate.
//!
//! Any subcommand outside the read-only allow-list may create objects, so
//! before the first one runs the handle checks that `user.name` and
//! `user.email` are both configured. A successful check is remembered for
//! the lifetime of the handle; a failed one is not, so configuring the
//! identity externally unblocks the next mutating call.

use std::cell::Cell;

use tracing::debug;

use super::error::GitError;
use super::runner::{CommandRunner, GitCommand, Subcommand};

impl Subcommand {
    /// Whether the subcommand is on the read-only allow-list.
    ///
    /// # Example
    ///
    /// ```
    /// use tracflow::git::Subcommand;
    ///
    /// assert!(Subcommand::Status.is_safe());
    /// assert!(!Subcommand::Commit.is_safe());
    /// ```
    pub fn is_safe(self) -> bool {
        matches!(
            self,
            Subcommand::Config
                | Subcommand::Diff
                | Subcommand::Grep
                | Subcommand::Log
                | Subcommand::LsRemote
                | Subcommand::Remote
                | Subcommand::Reset
                | Subcommand::Show
                | Subcommand::ShowRef
                | Subcommand::Status
                | Subcommand::SymbolicRef
        )
    }
}

/// One-time committer identity check, owned by a single `Git` handle.
#[derive(Debug, Default)]
pub(crate) struct IdentityGate {
    verified: Cell<bool>,
}

impl IdentityGate {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn is_verified(&self) -> bool {
        self.verified.get()
    }

    /// Let `subcommand` through, checking the identity first if it is unsafe.
    pub(crate) fn admit(
        &self,
        subcommand: Subcommand,
        runner: &CommandRunner,
    ) -> Result<(), GitError> {
        if subcommand.is_safe() || self.verified.get() {
            return Ok(());
        }

        let configured = has_value(runner, "user.name")? && has_value(runner, "user.email")?;
        debug!(configured, "checked committer identity");
        if !configured {
            return Err(GitError::MissingIdentity);
        }
        self.verified.set(true);
        Ok(())
    }
}

fn has_value(runner: &CommandRunner, key: &str) -> Result<bool, GitError> {
    let result = runner.run(&GitCommand::new(Subcommand::Config).arg(key))?;
    Ok(result.success() && !result.stdout.trim().is_empty())
}
