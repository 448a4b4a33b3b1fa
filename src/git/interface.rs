//! git::interface
//!
//! The `Git` handle: the **single doorway** to the git binary.
//!
//! Every call goes through [`Git::execute`] (or one of its policies), which
//! applies the identity gate for mutating subcommands, launches the process
//! through the [`CommandRunner`], and turns a non-zero exit into
//! [`GitError::CommandFailed`].
//!
//! # Execution policies
//!
//! | method                 | returns      | non-zero exit          |
//! |------------------------|--------------|------------------------|
//! | [`Git::execute`]       | stdout       | `CommandFailed`        |
//! | [`Git::execute_silent`]| `()`         | `CommandFailed`        |
//! | [`Git::exit_code`]     | exit code    | returned, not raised   |
//! | [`Git::execute_echo`]  | stdout       | `CommandFailed`        |
//!
//! `execute_echo` additionally writes both streams to the console.
//!
//! # Example
//!
//! ```ignore
//! use tracflow::git::{Git, GitCommand, Subcommand};
//! use std::path::Path;
//!
//! let git = Git::open(Path::new("."))?;
//! let status = git.execute(&GitCommand::new(Subcommand::Status).flag("z"))?;
//! ```

use std::path::{Path, PathBuf};

use super::error::GitError;
use super::runner::{CommandResult, CommandRunner, GitCommand, Subcommand};
use super::safety::IdentityGate;
use crate::core::commit::Commit;
use crate::ui::output;

/// Handle to one repository.
///
/// Handles are independent: each pins its own `GIT_DIR`/`GIT_WORK_TREE` on
/// every invocation and owns its own identity-check flag. A handle is not
/// `Sync`; callers serialize access to one repository.
#[derive(Debug)]
pub struct Git {
    runner: CommandRunner,
    identity: IdentityGate,
}

impl Git {
    // =========================================================================
    // Construction
    // =========================================================================

    /// Open the repository containing `path`.
    ///
    /// `path` can be any directory within the work tree.
    ///
    /// # Errors
    ///
    /// - [`GitError::NotARepo`] if no repository is found
    /// - [`GitError::BareRepo`] if the repository has no work tree
    pub fn open(path: &Path) -> Result<Self, GitError> {
        let repo = git2::Repository::discover(path).map_err(|_| GitError::NotARepo {
            path: path.to_path_buf(),
        })?;

        let work_tree = repo.workdir().ok_or(GitError::BareRepo)?.to_path_buf();
        let git_dir = repo.path().to_path_buf();

        Ok(Self::with_paths(work_tree, git_dir))
    }

    /// Build a handle from explicit paths, without discovery.
    pub fn with_paths(work_tree: impl Into<PathBuf>, git_dir: impl Into<PathBuf>) -> Self {
        Self {
            runner: CommandRunner::new(git_dir.into(), work_tree.into()),
            identity: IdentityGate::new(),
        }
    }

    /// Use a different git executable.
    pub fn with_git_cmd(mut self, git_cmd: impl Into<String>) -> Self {
        self.runner.set_git_cmd(git_cmd);
        self
    }

    /// Log every invocation and its output at debug level.
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.runner.set_verbose(verbose);
        self
    }

    /// Set an environment variable on every invocation.
    ///
    /// Used for non-interactive editor substitutes during automated
    /// rebases, e.g. `GIT_SEQUENCE_EDITOR`.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.runner.push_env(key, value);
        self
    }

    pub fn git_dir(&self) -> &Path {
        self.runner.git_dir()
    }

    pub fn work_tree(&self) -> &Path {
        self.runner.work_tree()
    }

    pub fn git_cmd(&self) -> &str {
        self.runner.git_cmd()
    }

    /// Whether the committer identity has been verified on this handle.
    pub fn identity_verified(&self) -> bool {
        self.identity.is_verified()
    }

    // =========================================================================
    // Execution
    // =========================================================================

    /// Every policy launches through here.
    fn run_gated(&self, cmd: &GitCommand) -> Result<CommandResult, GitError> {
        self.identity.admit(cmd.subcommand(), &self.runner)?;
        self.runner.run(cmd)
    }

    /// Run and return stdout.
    ///
    /// # Errors
    ///
    /// - [`GitError::MissingIdentity`] before launching a mutating command
    ///   when no committer identity is configured
    /// - [`GitError::CommandFailed`] on a non-zero exit
    pub fn execute(&self, cmd: &GitCommand) -> Result<String, GitError> {
        let result = self.run_gated(cmd)?;
        if !result.success() {
            return Err(GitError::command_failed(result));
        }
        Ok(result.stdout)
    }

    /// Run, discarding stdout.
    pub fn execute_silent(&self, cmd: &GitCommand) -> Result<(), GitError> {
        self.execute(cmd).map(|_| ())
    }

    /// Run and return the exit code; a non-zero exit is not an error.
    pub fn exit_code(&self, cmd: &GitCommand) -> Result<i32, GitError> {
        Ok(self.run_gated(cmd)?.exit_code)
    }

    /// Like [`Self::execute`], with extra environment for this call only.
    pub fn run_with_env<K, V>(&self, cmd: &GitCommand, env: &[(K, V)]) -> Result<String, GitError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let cmd = env
            .iter()
            .fold(cmd.clone(), |cmd, (k, v)| cmd.env(k.as_ref(), v.as_ref()));
        self.execute(&cmd)
    }

    /// Run, echoing both streams to the console.
    pub fn execute_echo(&self, cmd: &GitCommand) -> Result<String, GitError> {
        let result = self.run_gated(cmd)?;
        output::echo(&result.stdout, &result.stderr);
        if !result.success() {
            return Err(GitError::command_failed(result));
        }
        Ok(result.stdout)
    }

    // =========================================================================
    // Refs
    // =========================================================================

    /// Commit a fully qualified ref points to.
    ///
    /// # Errors
    ///
    /// [`GitError::CommandFailed`] if the ref does not exist.
    pub fn resolve_ref(&self, refname: &str) -> Result<Commit, GitError> {
        let out = self.execute(
            &GitCommand::new(Subcommand::ShowRef)
                .flag("hash")
                .flag("verify")
                .arg(refname),
        )?;
        Ok(Commit::parse(out.trim())?)
    }

    /// Commit a ref points to, or `None` if the ref does not exist.
    pub fn commit_for_ref(&self, refname: &str) -> Result<Option<Commit>, GitError> {
        match self.resolve_ref(refname) {
            Ok(commit) => Ok(Some(commit)),
            Err(GitError::CommandFailed { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Commit of the local branch `branch`, or `None` if it does not exist.
    pub fn commit_for_branch(&self, branch: &str) -> Result<Option<Commit>, GitError> {
        self.commit_for_ref(&format!("refs/heads/{branch}"))
    }

    /// Whether `refs/heads/<branch>` exists.
    pub fn branch_exists(&self, branch: &str) -> Result<bool, GitError> {
        let cmd = GitCommand::new(Subcommand::ShowRef)
            .flag("verify")
            .flag("quiet")
            .arg(format!("refs/heads/{branch}"));
        Ok(self.exit_code(&cmd)? == 0)
    }

    /// Commit HEAD points to.
    pub fn head(&self) -> Result<Commit, GitError> {
        let out = self.execute(
            &GitCommand::new(Subcommand::ShowRef)
                .flag("head")
                .arg("HEAD"),
        )?;
        let sha = out
            .lines()
            .next()
            .and_then(|line| line.get(..40))
            .ok_or_else(|| GitError::UnexpectedOutput {
                command: "show-ref --head".to_string(),
                detail: format!("no HEAD line in {out:?}"),
            })?;
        Ok(Commit::parse(sha)?)
    }

    /// Short name of the branch HEAD points to.
    ///
    /// # Errors
    ///
    /// - [`GitError::DetachedHead`] if HEAD is not a symbolic ref (exit 1)
    /// - [`GitError::CommandFailed`] for any other failure
    pub fn current_branch_name(&self) -> Result<String, GitError> {
        let cmd = GitCommand::new(Subcommand::SymbolicRef)
            .flag("short")
            .flag("quiet")
            .arg("HEAD");
        match self.execute(&cmd) {
            Ok(out) => Ok(out.trim().to_string()),
            Err(GitError::CommandFailed { exit_code: 1, .. }) => Err(GitError::DetachedHead),
            Err(e) => Err(e),
        }
    }

    /// Whether `a` is an ancestor of `b` (or equal to it).
    pub fn is_ancestor_of(&self, a: &str, b: &str) -> Result<bool, GitError> {
        let out = self.execute(&GitCommand::new(Subcommand::RevList).arg(format!("{b}..{a}")))?;
        Ok(out.lines().next().is_none())
    }

    /// Whether `a` is a descendant of `b` (or equal to it).
    pub fn is_child_of(&self, a: &str, b: &str) -> Result<bool, GitError> {
        self.is_ancestor_of(b, a)
    }

    /// Rename a local branch.
    pub fn rename_branch(&self, old: &str, new: &str) -> Result<(), GitError> {
        self.execute_silent(
            &GitCommand::new(Subcommand::Branch)
                .flag("move")
                .arg(old)
                .arg(new),
        )
    }

    // =========================================================================
    // Work tree
    // =========================================================================

    /// Paths of untracked, non-ignored files.
    pub fn untracked_files(&self) -> Result<Vec<String>, GitError> {
        let out = self.execute(
            &GitCommand::new(Subcommand::LsFiles)
                .flag("others")
                .flag("exclude_standard")
                .flag("z"),
        )?;
        Ok(out
            .split('\0')
            .take_while(|token| !token.is_empty())
            .map(str::to_string)
            .collect())
    }

    /// Discard changes to tracked files, optionally removing untracked
    /// files, untracked directories and ignored files too.
    ///
    /// # Errors
    ///
    /// [`GitError::InvalidArgument`] if directories or ignored files are
    /// requested without untracked files.
    pub fn reset_to_clean_working_directory(
        &self,
        remove_untracked_files: bool,
        remove_untracked_directories: bool,
        remove_ignored: bool,
    ) -> Result<(), GitError> {
        if remove_untracked_directories && !remove_untracked_files {
            return Err(GitError::InvalidArgument(
                "remove_untracked_directories only valid if remove_untracked_files is set"
                    .to_string(),
            ));
        }
        if remove_ignored && !remove_untracked_files {
            return Err(GitError::InvalidArgument(
                "remove_ignored only valid if remove_untracked_files is set".to_string(),
            ));
        }

        self.execute_silent(&GitCommand::new(Subcommand::Reset).flag("hard"))?;
        if remove_untracked_files {
            let clean = GitCommand::new(Subcommand::Clean)
                .flag("f")
                .switch("d", remove_untracked_directories)
                .switch("x", remove_ignored);
            self.execute_silent(&clean)?;
        }
        Ok(())
    }
}

impl std::fmt::Display for Git {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interface to git repo at {}", self.work_tree().display())
    }
}
