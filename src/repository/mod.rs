//! repository
//!
//! The repository façade consumed by front ends.
//!
//! # Architecture
//!
//! [`Repository`] combines a [`Git`] handle with the [`RepoSettings`] of one
//! repository. It owns the chosen base commit and answers the questions a
//! ticket workflow asks: what changed since the base, which branches exist,
//! which branch is checked out, what the history of a branch looks like.
//! All parsing is delegated to [`crate::core`]; all process launch to
//! [`crate::git`].
//!
//! # Example
//!
//! ```ignore
//! use tracflow::core::config::RepoSettings;
//! use tracflow::git::Git;
//! use tracflow::repository::Repository;
//! use std::path::Path;
//!
//! let repo = Repository::new(Git::open(Path::new("."))?, RepoSettings::default());
//! for file in repo.changes()? {
//!     println!("{file}");
//! }
//! ```

use std::cell::RefCell;
use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::core::branch::Branch;
use crate::core::changes::{self, ChangedFile};
use crate::core::commit::Commit;
use crate::core::config::RepoSettings;
use crate::core::naming::BranchNaming;
use crate::git::{Git, GitCommand, GitError, Subcommand};

/// Diff algorithm passed to `git diff --diff-algorithm`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiffAlgorithm {
    Patience,
    #[default]
    Minimal,
    Histogram,
    Myers,
}

impl DiffAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            DiffAlgorithm::Patience => "patience",
            DiffAlgorithm::Minimal => "minimal",
            DiffAlgorithm::Histogram => "histogram",
            DiffAlgorithm::Myers => "myers",
        }
    }
}

impl FromStr for DiffAlgorithm {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patience" => Ok(DiffAlgorithm::Patience),
            "minimal" => Ok(DiffAlgorithm::Minimal),
            "histogram" => Ok(DiffAlgorithm::Histogram),
            "myers" => Ok(DiffAlgorithm::Myers),
            other => Err(GitError::InvalidArgument(format!(
                "unknown diff algorithm '{other}'"
            ))),
        }
    }
}

impl fmt::Display for DiffAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A repository with its workflow settings.
#[derive(Debug)]
pub struct Repository {
    git: Git,
    settings: RepoSettings,
    base_commit: RefCell<Option<Commit>>,
}

impl Repository {
    pub fn new(git: Git, settings: RepoSettings) -> Self {
        Self {
            git,
            settings,
            base_commit: RefCell::new(None),
        }
    }

    pub fn git(&self) -> &Git {
        &self.git
    }

    pub fn settings(&self) -> &RepoSettings {
        &self.settings
    }

    pub fn naming(&self) -> &BranchNaming {
        &self.settings.naming
    }

    // =========================================================================
    // Base commit
    // =========================================================================

    /// The commit changes are reported against. Defaults to HEAD.
    pub fn base_commit(&self) -> Result<Commit, GitError> {
        if let Some(commit) = self.base_commit.borrow().as_ref() {
            return Ok(commit.clone());
        }
        let head = self.head()?;
        *self.base_commit.borrow_mut() = Some(head.clone());
        Ok(head)
    }

    pub fn set_base_commit(&self, commit: Commit) {
        *self.base_commit.borrow_mut() = Some(commit);
    }

    /// Use whatever `rev` (a branch, tag or sha) points to as the base.
    pub fn set_base_ref(&self, rev: &str) -> Result<Commit, GitError> {
        let out = self.git.execute(
            &GitCommand::new(Subcommand::Log)
                .value("max_count", 1)
                .value("format", "%H")
                .arg(rev),
        )?;
        let commit = Commit::parse(out.trim())?;
        self.set_base_commit(commit.clone());
        Ok(commit)
    }

    /// Forget the chosen base; the next access falls back to HEAD.
    pub fn reset_base_commit(&self) {
        *self.base_commit.borrow_mut() = None;
    }

    // =========================================================================
    // Commits
    // =========================================================================

    pub fn head(&self) -> Result<Commit, GitError> {
        self.git.head()
    }

    /// Tip of the configured baseline branch.
    pub fn baseline(&self) -> Result<Commit, GitError> {
        self.git
            .resolve_ref(&format!("refs/heads/{}", self.settings.baseline))
    }

    /// Commits reachable from `commit` but not from the baseline, newest
    /// first, at most `history_limit` of them; the baseline tip is appended
    /// as the oldest entry.
    pub fn history(&self, commit: &Commit) -> Result<Vec<Commit>, GitError> {
        let baseline = self.baseline()?;
        let out = self.git.execute(
            &GitCommand::new(Subcommand::Log)
                .value("format", "%H %s")
                .value("max_count", self.settings.history_limit)
                .arg(commit.sha1().as_str())
                .arg(format!("^{}", baseline.sha1())),
        )?;

        let mut result = Vec::new();
        for line in out.lines().filter(|l| !l.is_empty()) {
            let (sha, title) = line.split_once(' ').unwrap_or((line, ""));
            result.push(Commit::parse(sha)?.with_title(title));
        }
        result.push(baseline);
        Ok(result)
    }

    /// `git log` entry for one commit.
    pub fn commit_log(&self, commit: &Commit, format: Option<&str>) -> Result<String, GitError> {
        self.git.execute(
            &GitCommand::new(Subcommand::Log)
                .value("format", format.unwrap_or("fuller"))
                .value("max_count", 1)
                .arg(commit.sha1().as_str()),
        )
    }

    // =========================================================================
    // Branches
    // =========================================================================

    pub fn get_branch(&self, name: &str) -> Result<Branch, GitError> {
        Branch::parse(self.naming(), name)
    }

    /// Local branches, oldest commit first.
    ///
    /// Branches whose names fall outside the naming grammar are skipped.
    pub fn local_branches(&self) -> Result<Vec<Branch>, GitError> {
        let out = self.git.execute(
            &GitCommand::new(Subcommand::ForEachRef)
                .value("sort", "committerdate")
                .value("format", "%(objectname) %(refname:short)")
                .arg("refs/heads/"),
        )?;
        parse_ref_listing(self.naming(), &out)
    }

    /// The checked-out branch.
    ///
    /// # Errors
    ///
    /// [`GitError::DetachedHead`] if HEAD is detached.
    pub fn current_branch(&self) -> Result<Branch, GitError> {
        let name = self.git.current_branch_name()?;
        self.get_branch(&name)
    }

    /// Check out a branch, fetching it from the ticket remote first if it
    /// does not exist locally.
    ///
    /// Names containing `/` are managed branches; `ticket` selects the ticket
    /// component. The base commit is reset to the new HEAD.
    pub fn checkout_branch(&self, name: &str, ticket: Option<u64>) -> Result<Branch, GitError> {
        let branch = if name.contains('/') {
            Branch::managed(self.naming(), ticket, name)
        } else {
            Branch::local(name)
        };
        let full_name = branch.full_name();

        if !self.git.branch_exists(full_name)? {
            debug!(branch = full_name, remote = %self.settings.remote, "fetching missing branch");
            self.git.execute_silent(
                &GitCommand::new(Subcommand::Fetch)
                    .arg(self.settings.remote.as_str())
                    .arg(name),
            )?;
            self.git.execute_silent(
                &GitCommand::new(Subcommand::Branch)
                    .arg(full_name)
                    .arg("FETCH_HEAD"),
            )?;
        }

        self.git
            .execute_silent(&GitCommand::new(Subcommand::Checkout).arg(full_name))?;
        self.reset_base_commit();
        Ok(branch)
    }

    pub fn rename_branch(&self, old: &str, new: &str) -> Result<(), GitError> {
        self.git.rename_branch(old, new)
    }

    // =========================================================================
    // Changes
    // =========================================================================

    /// Every path changed since the base commit, sorted by path.
    ///
    /// Live status takes precedence over committed history; see
    /// [`changes::resolve`].
    pub fn changes(&self) -> Result<Vec<ChangedFile>, GitError> {
        let base = self.base_commit()?;
        let numstat = self.git.execute(
            &GitCommand::new(Subcommand::Diff)
                .flag("numstat")
                .flag("z")
                .arg(base.sha1().as_str()),
        )?;
        let status = self.git.execute(&GitCommand::new(Subcommand::Status).flag("z"))?;
        changes::resolve(&numstat, &status, &base)
    }

    /// Paths changed between two commits.
    pub fn diff_index(&self, from: &Commit, to: &Commit) -> Result<Vec<ChangedFile>, GitError> {
        let numstat = self.git.execute(
            &GitCommand::new(Subcommand::Diff)
                .flag("numstat")
                .flag("z")
                .arg(from.sha1().as_str())
                .arg(to.sha1().as_str()),
        )?;
        changes::range_diff(&numstat, from, to)
    }

    pub fn untracked_files(&self) -> Result<Vec<ChangedFile>, GitError> {
        Ok(self
            .git
            .untracked_files()?
            .into_iter()
            .map(|path| ChangedFile::Untracked { path })
            .collect())
    }

    /// Diff text for one changed file.
    ///
    /// # Errors
    ///
    /// [`GitError::NotDiffable`] for binary and untracked files.
    pub fn file_diff(
        &self,
        file: &ChangedFile,
        algorithm: DiffAlgorithm,
    ) -> Result<String, GitError> {
        let cmd = GitCommand::new(Subcommand::Diff).value("diff_algorithm", algorithm);
        self.git.execute(&with_diff_target(cmd, file)?)
    }

    /// Word diff for one changed file, in porcelain format.
    pub fn file_word_diff(&self, file: &ChangedFile) -> Result<String, GitError> {
        let cmd = GitCommand::new(Subcommand::Diff).value("word_diff", "porcelain");
        self.git.execute(&with_diff_target(cmd, file)?)
    }
}

/// Append the commits and the path a diff of `file` needs.
fn with_diff_target(cmd: GitCommand, file: &ChangedFile) -> Result<GitCommand, GitError> {
    if file.is_binary() {
        return Err(GitError::NotDiffable {
            path: file.path().to_string(),
            reason: "binary file".to_string(),
        });
    }
    let cmd = match file {
        ChangedFile::Committed(d) | ChangedFile::Staged(d) | ChangedFile::Unstaged(d) => {
            cmd.arg(d.commit.sha1().as_str())
        }
        ChangedFile::Range(d) => cmd.arg(d.from.sha1().as_str()).arg(d.to.sha1().as_str()),
        ChangedFile::Untracked { path } => {
            return Err(GitError::NotDiffable {
                path: path.clone(),
                reason: "untracked file".to_string(),
            })
        }
    };
    Ok(cmd.arg("--").arg(file.path()))
}

/// Parse `for-each-ref --format='%(objectname) %(refname:short)'` output.
fn parse_ref_listing(naming: &BranchNaming, out: &str) -> Result<Vec<Branch>, GitError> {
    let mut result = Vec::new();
    for line in out.lines().filter(|l| !l.is_empty()) {
        let (sha, name) = line
            .split_once(' ')
            .ok_or_else(|| GitError::UnexpectedOutput {
                command: "for-each-ref".to_string(),
                detail: format!("malformed ref line {line:?}"),
            })?;
        let commit = Commit::parse(sha)?;
        match Branch::parse(naming, name) {
            Ok(branch) => result.push(branch.with_commit(commit)),
            Err(e) => debug!(branch = name, error = %e, "skipping branch"),
        }
    }
    Ok(result)
}
