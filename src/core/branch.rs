//! core::branch
//!
//! Branch value objects.
//!
//! A [`Branch`] is either a plain [`LocalBranch`] or a [`ManagedBranch`]
//! whose name encodes a ticket. Both resolve their commit lazily: the first
//! call to [`Branch::commit`] asks git, later calls return the memoized
//! value. Branches read from a ref listing are created with their commit
//! already known.

use std::cell::OnceCell;
use std::cmp::Ordering;

use super::commit::Commit;
use super::naming::{self, BranchNaming, ParsedName};
use crate::git::{Git, GitError};

/// A branch outside the naming convention.
#[derive(Debug, Clone)]
pub struct LocalBranch {
    name: String,
    commit: OnceCell<Commit>,
}

impl LocalBranch {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// A branch named `<prefix><ticket-or-none>/<description>`.
#[derive(Debug, Clone)]
pub struct ManagedBranch {
    ticket: Option<u64>,
    description: String,
    full_name: String,
    commit: OnceCell<Commit>,
}

impl ManagedBranch {
    pub fn ticket(&self) -> Option<u64> {
        self.ticket
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }
}

/// A local branch of either kind.
///
/// # Example
///
/// ```
/// use tracflow::core::branch::Branch;
/// use tracflow::core::naming::BranchNaming;
///
/// let naming = BranchNaming::new("sageui/");
/// let branch = Branch::parse(&naming, "sageui/1001/u/bob/work").unwrap();
/// assert_eq!(branch.ticket(), Some(1001));
/// assert_eq!(branch.name(), "u/bob/work");
/// assert_eq!(branch.full_name(), "sageui/1001/u/bob/work");
///
/// let local = Branch::parse(&naming, "my_branch").unwrap();
/// assert!(!local.is_managed());
/// assert_eq!(local.ticket_label(), "local");
/// ```
#[derive(Debug, Clone)]
pub enum Branch {
    Local(LocalBranch),
    Managed(ManagedBranch),
}

impl Branch {
    /// A plain local branch.
    pub fn local(name: impl Into<String>) -> Self {
        Branch::Local(LocalBranch {
            name: name.into(),
            commit: OnceCell::new(),
        })
    }

    /// A managed branch; the full name is derived from `naming`.
    pub fn managed(naming: &BranchNaming, ticket: Option<u64>, description: impl Into<String>) -> Self {
        let description = description.into();
        Branch::Managed(ManagedBranch {
            full_name: naming.format(ticket, &description),
            ticket,
            description,
            commit: OnceCell::new(),
        })
    }

    /// Classify a raw branch name.
    ///
    /// # Errors
    ///
    /// [`GitError::UnparsableBranchName`] if the name falls outside the
    /// grammar.
    pub fn parse(naming: &BranchNaming, raw: &str) -> Result<Self, GitError> {
        Ok(match naming.parse(raw)? {
            ParsedName::Local(name) => Branch::local(name),
            ParsedName::Managed {
                ticket,
                description,
            } => Branch::managed(naming, ticket, description),
        })
    }

    /// Attach an already-known commit.
    pub fn with_commit(self, commit: Commit) -> Self {
        let cell = OnceCell::from(commit);
        match self {
            Branch::Local(b) => Branch::Local(LocalBranch { commit: cell, ..b }),
            Branch::Managed(b) => Branch::Managed(ManagedBranch { commit: cell, ..b }),
        }
    }

    pub fn is_managed(&self) -> bool {
        matches!(self, Branch::Managed(_))
    }

    /// Short name: the bare name, or the description of a managed branch.
    pub fn name(&self) -> &str {
        match self {
            Branch::Local(b) => &b.name,
            Branch::Managed(b) => &b.description,
        }
    }

    /// Name of the ref under `refs/heads/`.
    pub fn full_name(&self) -> &str {
        match self {
            Branch::Local(b) => &b.name,
            Branch::Managed(b) => &b.full_name,
        }
    }

    pub fn refname(&self) -> String {
        format!("refs/heads/{}", self.full_name())
    }

    pub fn ticket(&self) -> Option<u64> {
        match self {
            Branch::Local(_) => None,
            Branch::Managed(b) => b.ticket,
        }
    }

    /// `local` for unmanaged branches, otherwise the ticket or `none`.
    pub fn ticket_label(&self) -> String {
        match self {
            Branch::Local(_) => "local".to_string(),
            Branch::Managed(b) => naming::ticket_string(b.ticket),
        }
    }

    fn commit_cell(&self) -> &OnceCell<Commit> {
        match self {
            Branch::Local(b) => &b.commit,
            Branch::Managed(b) => &b.commit,
        }
    }

    /// The commit, if it has been resolved already.
    pub fn cached_commit(&self) -> Option<&Commit> {
        self.commit_cell().get()
    }

    /// The commit the branch points to, resolved on first access.
    ///
    /// # Errors
    ///
    /// [`GitError::CommandFailed`] if the branch does not exist.
    pub fn commit(&self, git: &Git) -> Result<&Commit, GitError> {
        let cell = self.commit_cell();
        if let Some(commit) = cell.get() {
            return Ok(commit);
        }
        let commit = git.resolve_ref(&self.refname())?;
        Ok(cell.get_or_init(|| commit))
    }

    fn sort_key(&self) -> (bool, &str, Option<&Commit>) {
        (self.is_managed(), self.full_name(), self.cached_commit())
    }
}

impl PartialEq for Branch {
    fn eq(&self, other: &Self) -> bool {
        self.sort_key() == other.sort_key()
    }
}

impl Eq for Branch {}

impl PartialOrd for Branch {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Branch {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl std::fmt::Display for Branch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Git branch {}", self.full_name())
    }
}
