//! git::runner
//!
//! Process launch for the git binary.
//!
//! A [`GitCommand`] is built the way `std::process::Command` is: a
//! [`Subcommand`] from the static dispatch table, then flags, positional
//! arguments and extra environment. [`CommandRunner::run`] launches it with
//! `GIT_DIR` and `GIT_WORK_TREE` pinned to the runner's repository and
//! returns a [`CommandResult`] whatever the exit code; deciding what a
//! non-zero exit means is left to [`crate::git::Git::execute`].
//!
//! # Flag translation
//!
//! | flag                         | argv                  |
//! |------------------------------|-----------------------|
//! | `z` = on                     | `-z`                  |
//! | `exclude_standard` = on      | `--exclude-standard`  |
//! | `max_count` = `20`           | `--max-count=20`      |
//! | `n` = `5`                    | `-n 5`                |
//! | any key = off                | nothing               |

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::str::FromStr;

use tracing::debug;

use super::error::GitError;

/// The git subcommands this layer is allowed to invoke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subcommand {
    Add,
    Am,
    Apply,
    Bisect,
    Branch,
    Checkout,
    CherryPick,
    Clean,
    Clone,
    Commit,
    Config,
    Diff,
    Fetch,
    ForEachRef,
    FormatPatch,
    Grep,
    Init,
    Log,
    LsFiles,
    LsRemote,
    Merge,
    Mv,
    Pull,
    Push,
    Rebase,
    Remote,
    Reset,
    RevList,
    Rm,
    Show,
    ShowRef,
    Stash,
    Status,
    SymbolicRef,
    Tag,
}

impl Subcommand {
    /// Every allowed subcommand, in alphabetical order.
    pub const ALL: &'static [Subcommand] = &[
        Subcommand::Add,
        Subcommand::Am,
        Subcommand::Apply,
        Subcommand::Bisect,
        Subcommand::Branch,
        Subcommand::Checkout,
        Subcommand::CherryPick,
        Subcommand::Clean,
        Subcommand::Clone,
        Subcommand::Commit,
        Subcommand::Config,
        Subcommand::Diff,
        Subcommand::Fetch,
        Subcommand::ForEachRef,
        Subcommand::FormatPatch,
        Subcommand::Grep,
        Subcommand::Init,
        Subcommand::Log,
        Subcommand::LsFiles,
        Subcommand::LsRemote,
        Subcommand::Merge,
        Subcommand::Mv,
        Subcommand::Pull,
        Subcommand::Push,
        Subcommand::Rebase,
        Subcommand::Remote,
        Subcommand::Reset,
        Subcommand::RevList,
        Subcommand::Rm,
        Subcommand::Show,
        Subcommand::ShowRef,
        Subcommand::Stash,
        Subcommand::Status,
        Subcommand::SymbolicRef,
        Subcommand::Tag,
    ];

    /// The name passed to git.
    pub fn as_str(self) -> &'static str {
        match self {
            Subcommand::Add => "add",
            Subcommand::Am => "am",
            Subcommand::Apply => "apply",
            Subcommand::Bisect => "bisect",
            Subcommand::Branch => "branch",
            Subcommand::Checkout => "checkout",
            Subcommand::CherryPick => "cherry-pick",
            Subcommand::Clean => "clean",
            Subcommand::Clone => "clone",
            Subcommand::Commit => "commit",
            Subcommand::Config => "config",
            Subcommand::Diff => "diff",
            Subcommand::Fetch => "fetch",
            Subcommand::ForEachRef => "for-each-ref",
            Subcommand::FormatPatch => "format-patch",
            Subcommand::Grep => "grep",
            Subcommand::Init => "init",
            Subcommand::Log => "log",
            Subcommand::LsFiles => "ls-files",
            Subcommand::LsRemote => "ls-remote",
            Subcommand::Merge => "merge",
            Subcommand::Mv => "mv",
            Subcommand::Pull => "pull",
            Subcommand::Push => "push",
            Subcommand::Rebase => "rebase",
            Subcommand::Remote => "remote",
            Subcommand::Reset => "reset",
            Subcommand::RevList => "rev-list",
            Subcommand::Rm => "rm",
            Subcommand::Show => "show",
            Subcommand::ShowRef => "show-ref",
            Subcommand::Stash => "stash",
            Subcommand::Status => "status",
            Subcommand::SymbolicRef => "symbolic-ref",
            Subcommand::Tag => "tag",
        }
    }
}

impl FromStr for Subcommand {
    type Err = GitError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Subcommand::ALL
            .iter()
            .copied()
            .find(|sub| sub.as_str() == s)
            .ok_or_else(|| GitError::InvalidArgument(format!("unsupported git subcommand '{s}'")))
    }
}

impl std::fmt::Display for Subcommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value of a keyword flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlagValue {
    /// `true` emits the bare flag, `false` suppresses it.
    Switch(bool),
    /// Emits the flag with a value.
    Value(String),
}

/// Keyword flags, kept in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GitFlags {
    entries: Vec<(String, FlagValue)>,
}

impl GitFlags {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a boolean flag.
    pub fn switch(mut self, key: impl Into<String>, on: bool) -> Self {
        self.entries.push((key.into(), FlagValue::Switch(on)));
        self
    }

    /// Add a flag carrying a value.
    pub fn value(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.entries
            .push((key.into(), FlagValue::Value(value.to_string())));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate to argv.
    ///
    /// # Example
    ///
    /// ```
    /// use tracflow::git::GitFlags;
    ///
    /// let flags = GitFlags::new()
    ///     .switch("z", true)
    ///     .switch("exclude_standard", true)
    ///     .switch("quiet", false)
    ///     .value("max_count", 20);
    /// assert_eq!(flags.to_args(), ["-z", "--exclude-standard", "--max-count=20"]);
    /// ```
    pub fn to_args(&self) -> Vec<String> {
        let mut args = Vec::with_capacity(self.entries.len());
        for (key, value) in &self.entries {
            let short = key.chars().count() == 1;
            let flag = if short {
                format!("-{key}")
            } else {
                format!("--{}", key.replace('_', "-"))
            };
            match value {
                FlagValue::Switch(true) => args.push(flag),
                FlagValue::Switch(false) => {}
                FlagValue::Value(v) if short => {
                    args.push(flag);
                    args.push(v.clone());
                }
                FlagValue::Value(v) => args.push(format!("{flag}={v}")),
            }
        }
        args
    }
}

/// A single git invocation, before launch.
///
/// # Example
///
/// ```
/// use tracflow::git::{GitCommand, Subcommand};
///
/// let cmd = GitCommand::new(Subcommand::Diff)
///     .flag("numstat")
///     .flag("z")
///     .arg("HEAD~1")
///     .opt_arg(None::<String>);
/// assert_eq!(cmd.to_argv(), ["diff", "--numstat", "-z", "HEAD~1"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitCommand {
    subcommand: Subcommand,
    flags: GitFlags,
    args: Vec<String>,
    env: Vec<(String, String)>,
}

impl GitCommand {
    pub fn new(subcommand: Subcommand) -> Self {
        Self {
            subcommand,
            flags: GitFlags::new(),
            args: Vec::new(),
            env: Vec::new(),
        }
    }

    pub fn subcommand(&self) -> Subcommand {
        self.subcommand
    }

    /// Add a positional argument.
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add a positional argument if present; `None` is dropped.
    pub fn opt_arg(mut self, arg: Option<impl Into<String>>) -> Self {
        if let Some(arg) = arg {
            self.args.push(arg.into());
        }
        self
    }

    /// Add several positional arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Add a bare flag.
    pub fn flag(self, key: impl Into<String>) -> Self {
        self.switch(key, true)
    }

    /// Add a boolean flag; `false` suppresses it.
    pub fn switch(mut self, key: impl Into<String>, on: bool) -> Self {
        self.flags = self.flags.switch(key, on);
        self
    }

    /// Add a flag with a value.
    pub fn value(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.flags = self.flags.value(key, value);
        self
    }

    /// Replace all flags.
    pub fn flags(mut self, flags: GitFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Set an extra environment variable for this invocation only.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Arguments after the executable: subcommand, flags, then positionals.
    pub fn to_argv(&self) -> Vec<String> {
        let mut argv = Vec::with_capacity(1 + self.args.len() + self.flags.entries.len());
        argv.push(self.subcommand.as_str().to_string());
        argv.extend(self.flags.to_args());
        argv.extend(self.args.iter().cloned());
        argv
    }
}

/// Outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandResult {
    /// Process exit code; `-1` if terminated by a signal.
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    /// Fully expanded command line, for messages and logs.
    pub cmd: String,
}

impl CommandResult {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Launches git against one repository.
#[derive(Debug, Clone)]
pub struct CommandRunner {
    git_cmd: String,
    git_dir: PathBuf,
    work_tree: PathBuf,
    env: Vec<(String, String)>,
    verbose: bool,
}

impl CommandRunner {
    pub fn new(git_dir: PathBuf, work_tree: PathBuf) -> Self {
        Self {
            git_cmd: "git".to_string(),
            git_dir,
            work_tree,
            env: Vec::new(),
            verbose: false,
        }
    }

    pub fn set_git_cmd(&mut self, git_cmd: impl Into<String>) {
        self.git_cmd = git_cmd.into();
    }

    pub fn set_verbose(&mut self, verbose: bool) {
        self.verbose = verbose;
    }

    pub fn push_env(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.env.push((key.into(), value.into()));
    }

    pub fn git_cmd(&self) -> &str {
        &self.git_cmd
    }

    pub fn git_dir(&self) -> &std::path::Path {
        &self.git_dir
    }

    pub fn work_tree(&self) -> &std::path::Path {
        &self.work_tree
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Render the command line as it will be launched.
    pub fn command_line(&self, cmd: &GitCommand) -> String {
        std::iter::once(self.git_cmd.clone())
            .chain(cmd.to_argv())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Launch `cmd` and wait for it.
    ///
    /// A non-zero exit code is not an error here.
    ///
    /// # Errors
    ///
    /// [`GitError::Spawn`] if the executable cannot be started.
    pub fn run(&self, cmd: &GitCommand) -> Result<CommandResult, GitError> {
        let line = self.command_line(cmd);
        if self.verbose {
            debug!(cmd = %line, "running git");
        }

        let mut process = Command::new(&self.git_cmd);
        process
            .args(cmd.to_argv())
            .current_dir(&self.work_tree)
            .env("GIT_DIR", &self.git_dir)
            .env("GIT_WORK_TREE", &self.work_tree)
            .stdin(Stdio::null());
        for (key, value) in self.env.iter().chain(cmd.env.iter()) {
            process.env(key, value);
        }

        let output = process.output().map_err(|source| GitError::Spawn {
            cmd: line.clone(),
            source,
        })?;

        let result = CommandResult {
            exit_code: output.status.code().unwrap_or(-1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            cmd: line,
        };

        if self.verbose {
            log_stream("stdout", &result.stdout);
            log_stream("stderr", &result.stderr);
            debug!(cmd = %result.cmd, exit_code = result.exit_code, "git finished");
        }

        Ok(result)
    }
}

fn log_stream(stream: &'static str, text: &str) {
    for line in text.lines() {
        debug!(stream, "{}", line);
    }
}
