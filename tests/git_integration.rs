//! Integration tests for the Git interface.
//!
//! These tests use real git repositories created via tempfile to verify
//! that the Git interface works correctly with actual git operations.

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

use tracflow::git::{Git, GitCommand, GitError, RepoState, Subcommand};

/// Test fixture that creates a real git repository.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    /// Create a new test repository with an initial commit on `master`.
    fn new() -> Self {
        let repo = Self::without_identity();
        run_git(repo.path(), &["config", "user.email", "test@example.com"]);
        run_git(repo.path(), &["config", "user.name", "Test User"]);

        repo.commit_file("README.md", "# Test Repo\n", "Initial commit");
        repo
    }

    /// Create an empty repository with no committer identity of its own.
    fn without_identity() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        run_git(dir.path(), &["init", "-q", "-b", "master"]);
        run_git(dir.path(), &["config", "commit.gpgsign", "false"]);
        run_git(dir.path(), &["config", "core.editor", "true"]);
        Self { dir }
    }

    /// Get the path to the repository.
    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// Open a Git interface to this repository.
    fn git(&self) -> Git {
        Git::open(self.path()).expect("failed to open test repo")
    }

    /// Write a file and commit it.
    fn commit_file(&self, path: &str, content: &str, message: &str) {
        std::fs::write(self.path().join(path), content).unwrap();
        run_git(self.path(), &["add", path]);
        run_git(self.path(), &["commit", "-q", "-m", message]);
    }

    /// Get the sha of a revision using git directly.
    fn rev_parse(&self, rev: &str) -> String {
        let output = Command::new("git")
            .args(["rev-parse", rev])
            .current_dir(self.path())
            .output()
            .expect("git rev-parse failed");
        String::from_utf8(output.stdout).unwrap().trim().to_string()
    }

    /// Two branches that both change `conflict.txt`: `master` and `other`.
    fn with_conflicting_branches(self) -> Self {
        self.commit_file("conflict.txt", "base\n", "base");
        run_git(self.path(), &["checkout", "-q", "-b", "other"]);
        self.commit_file("conflict.txt", "other\n", "other side");
        run_git(self.path(), &["checkout", "-q", "master"]);
        self.commit_file("conflict.txt", "master\n", "master side");
        self
    }
}

/// Run a git command in the given directory.
fn run_git(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");

    if !output.status.success() {
        panic!(
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
    }
}

/// Run a git command that is expected to fail (e.g. a conflicting merge).
fn run_git_failing(dir: &Path, args: &[&str]) {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .expect("git command failed");
    assert!(!output.status.success(), "git {:?} unexpectedly succeeded", args);
}

// =============================================================================
// Repository Opening Tests
// =============================================================================

#[test]
fn open_valid_repository() {
    let repo = TestRepo::new();
    let git = repo.git();
    assert_eq!(
        git.work_tree().canonicalize().unwrap(),
        repo.path().canonicalize().unwrap()
    );
    assert!(git.git_dir().ends_with(".git"));
}

#[test]
fn open_from_subdirectory() {
    let repo = TestRepo::new();
    let subdir = repo.path().join("subdir");
    std::fs::create_dir(&subdir).unwrap();

    let git = Git::open(&subdir).unwrap();
    assert_eq!(git.head().unwrap().sha1().as_str(), repo.rev_parse("HEAD"));
}

#[test]
fn open_non_repository_fails() {
    let dir = TempDir::new().unwrap();
    let git = Git::open(dir.path());
    assert!(matches!(git, Err(GitError::NotARepo { .. })));
}

#[test]
fn open_bare_repository_fails() {
    let dir = TempDir::new().unwrap();
    run_git(dir.path(), &["init", "-q", "--bare"]);
    assert!(matches!(Git::open(dir.path()), Err(GitError::BareRepo)));
}

#[test]
fn missing_executable_is_a_spawn_error() {
    let repo = TestRepo::new();
    let git = repo.git().with_git_cmd("tracflow-no-such-git-binary");
    let err = git
        .execute(&GitCommand::new(Subcommand::Status))
        .unwrap_err();
    assert!(matches!(err, GitError::Spawn { .. }));
}

// =============================================================================
// Execution Policy Tests
// =============================================================================

#[test]
fn execute_returns_stdout() {
    let repo = TestRepo::new();
    let out = repo
        .git()
        .execute(&GitCommand::new(Subcommand::Log).value("format", "%s"))
        .unwrap();
    assert_eq!(out.trim(), "Initial commit");
}

#[test]
fn failed_command_reports_exit_code_and_streams() {
    let repo = TestRepo::new();
    let git = repo.git();
    run_git(repo.path(), &["branch", "branch1"]);
    run_git(repo.path(), &["branch", "branch2"]);
    git.rename_branch("branch1", "branch3").unwrap();

    let err = git.rename_branch("branch2", "branch3").unwrap_err();
    assert_eq!(err.exit_code(), Some(128));
    let message = err.to_string();
    assert!(message.starts_with(
        "git returned with non-zero exit code (128) when executing \"git branch --move branch2 branch3\""
    ));
    assert!(message.contains("\n    STDERR: fatal:"));
}

#[test]
fn exit_code_policy_does_not_raise() {
    let repo = TestRepo::new();
    let code = repo
        .git()
        .exit_code(
            &GitCommand::new(Subcommand::ShowRef)
                .flag("verify")
                .flag("quiet")
                .arg("refs/heads/nope"),
        )
        .unwrap();
    assert_ne!(code, 0);
}

#[test]
fn silent_policy_raises_on_failure() {
    let repo = TestRepo::new();
    let result = repo
        .git()
        .execute_silent(&GitCommand::new(Subcommand::Checkout).arg("does-not-exist"));
    assert!(matches!(result, Err(GitError::CommandFailed { .. })));
}

#[test]
fn echo_policy_returns_stdout_and_raises_on_failure() {
    let repo = TestRepo::new();
    let git = repo.git();

    let log = GitCommand::new(Subcommand::Log)
        .value("format", "%s")
        .value("max_count", 1);
    assert_eq!(git.execute_echo(&log).unwrap(), git.execute(&log).unwrap());

    let err = git
        .execute_echo(&GitCommand::new(Subcommand::Checkout).arg("no-such-branch"))
        .unwrap_err();
    assert!(matches!(err, GitError::CommandFailed { .. }));
}

#[test]
fn per_call_environment() {
    let repo = TestRepo::new();
    let git = repo.git();
    git.run_with_env(
        &GitCommand::new(Subcommand::Commit)
            .flag("allow_empty")
            .value("m", "empty"),
        &[("GIT_AUTHOR_NAME", "Somebody Else")],
    )
    .unwrap();

    let author = git
        .execute(
            &GitCommand::new(Subcommand::Log)
                .value("max_count", 1)
                .value("format", "%an/%cn"),
        )
        .unwrap();
    assert_eq!(author.trim(), "Somebody Else/Test User");
}

// =============================================================================
// Identity Tests
// =============================================================================

/// A handle that sees no global or system configuration.
fn isolated(repo: &TestRepo) -> Git {
    repo.git()
        .with_env("GIT_CONFIG_GLOBAL", "/dev/null")
        .with_env("GIT_CONFIG_NOSYSTEM", "1")
}

#[test]
fn mutating_command_without_identity_is_refused() {
    let repo = TestRepo::without_identity();
    std::fs::write(repo.path().join("file.txt"), "content\n").unwrap();
    let git = isolated(&repo);

    let err = git
        .execute(&GitCommand::new(Subcommand::Add).arg("file.txt"))
        .unwrap_err();
    assert!(matches!(err, GitError::MissingIdentity));
    assert!(!git.identity_verified());

    // Nothing was staged: the add never ran.
    let status = git
        .execute(&GitCommand::new(Subcommand::Status).flag("porcelain"))
        .unwrap();
    assert_eq!(status.trim(), "?? file.txt");
}

#[test]
fn commit_without_identity_creates_no_commit() {
    let repo = TestRepo::without_identity();
    let git = isolated(&repo);

    let err = git
        .execute(
            &GitCommand::new(Subcommand::Commit)
                .flag("allow_empty")
                .value("m", "should not exist"),
        )
        .unwrap_err();
    assert!(matches!(err, GitError::MissingIdentity));

    let code = git
        .exit_code(
            &GitCommand::new(Subcommand::ShowRef)
                .flag("verify")
                .flag("quiet")
                .arg("refs/heads/master"),
        )
        .unwrap();
    assert_ne!(code, 0);
}

#[test]
fn every_policy_applies_identity_gate() {
    let repo = TestRepo::without_identity();
    std::fs::write(repo.path().join("file.txt"), "content\n").unwrap();
    let git = isolated(&repo);
    let add = GitCommand::new(Subcommand::Add).arg("file.txt");

    assert!(matches!(git.exit_code(&add), Err(GitError::MissingIdentity)));
    assert!(matches!(git.execute_silent(&add), Err(GitError::MissingIdentity)));
    assert!(matches!(git.execute_echo(&add), Err(GitError::MissingIdentity)));
    assert!(matches!(
        git.run_with_env(&add, &[("GIT_EDITOR", "true")]),
        Err(GitError::MissingIdentity)
    ));
    assert!(!git.identity_verified());
}

#[test]
fn safe_commands_skip_identity_check() {
    let repo = TestRepo::without_identity();
    let git = isolated(&repo);
    git.execute(&GitCommand::new(Subcommand::Status)).unwrap();
    assert!(!git.identity_verified());
}

#[test]
fn identity_is_checked_once() {
    let repo = TestRepo::new();
    let git = repo.git();
    assert!(!git.identity_verified());
    git.untracked_files().unwrap();
    assert!(git.identity_verified());
}

// =============================================================================
// Ref Tests
// =============================================================================

#[test]
fn head_and_refs_resolve() {
    let repo = TestRepo::new();
    let git = repo.git();
    let head = repo.rev_parse("HEAD");

    assert_eq!(git.head().unwrap().sha1().as_str(), head);
    assert_eq!(
        git.resolve_ref("refs/heads/master").unwrap().sha1().as_str(),
        head
    );
    assert_eq!(
        git.commit_for_branch("master").unwrap().map(|c| c.sha1().to_string()),
        Some(head)
    );
    assert!(git.commit_for_branch("missing").unwrap().is_none());
    assert!(git.branch_exists("master").unwrap());
    assert!(!git.branch_exists("missing").unwrap());
}

#[test]
fn current_branch_and_detached_head() {
    let repo = TestRepo::new();
    repo.commit_file("second.txt", "2\n", "second");
    let git = repo.git();
    assert_eq!(git.current_branch_name().unwrap(), "master");

    run_git(repo.path(), &["checkout", "-q", "HEAD~"]);
    assert!(matches!(
        git.current_branch_name(),
        Err(GitError::DetachedHead)
    ));
}

#[test]
fn ancestry() {
    let repo = TestRepo::new();
    let first = repo.rev_parse("HEAD");
    repo.commit_file("second.txt", "2\n", "second");
    let second = repo.rev_parse("HEAD");
    let git = repo.git();

    assert!(git.is_ancestor_of(&first, &second).unwrap());
    assert!(!git.is_ancestor_of(&second, &first).unwrap());
    assert!(git.is_child_of(&second, &first).unwrap());
    assert!(git.is_ancestor_of(&first, &first).unwrap());
}

// =============================================================================
// Work Tree Tests
// =============================================================================

#[test]
fn untracked_files_are_listed() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("b.txt"), "").unwrap();
    std::fs::write(repo.path().join("a.txt"), "").unwrap();
    std::fs::write(repo.path().join(".gitignore"), "ignored.log\n").unwrap();
    std::fs::write(repo.path().join("ignored.log"), "").unwrap();

    let mut files = repo.git().untracked_files().unwrap();
    files.sort();
    assert_eq!(files, [".gitignore", "a.txt", "b.txt"]);
}

#[test]
fn clean_working_directory() {
    let repo = TestRepo::new();
    let git = repo.git();
    std::fs::write(repo.path().join("README.md"), "changed\n").unwrap();
    std::fs::write(repo.path().join("scratch.txt"), "").unwrap();

    git.reset_to_clean_working_directory(false, false, false).unwrap();
    assert_eq!(
        std::fs::read_to_string(repo.path().join("README.md")).unwrap(),
        "# Test Repo\n"
    );
    assert!(repo.path().join("scratch.txt").exists());

    git.reset_to_clean_working_directory(true, false, false).unwrap();
    assert!(!repo.path().join("scratch.txt").exists());
}

#[test]
fn clean_working_directory_rejects_invalid_combinations() {
    let repo = TestRepo::new();
    let git = repo.git();
    assert!(matches!(
        git.reset_to_clean_working_directory(false, true, false),
        Err(GitError::InvalidArgument(_))
    ));
    assert!(matches!(
        git.reset_to_clean_working_directory(false, false, true),
        Err(GitError::InvalidArgument(_))
    ));
}

// =============================================================================
// Repository State Tests
// =============================================================================

#[test]
fn clean_repository_has_no_state() {
    let repo = TestRepo::new();
    assert!(repo.git().state().is_empty());
    repo.git().reset_to_clean_state().unwrap();
}

#[test]
fn merge_conflict_is_aborted() {
    let repo = TestRepo::new().with_conflicting_branches();
    run_git_failing(repo.path(), &["merge", "other"]);
    let git = repo.git();

    assert_eq!(git.state(), vec![RepoState::Merge]);
    git.reset_to_clean_state().unwrap();
    assert!(git.state().is_empty());
    assert_eq!(
        std::fs::read_to_string(repo.path().join("conflict.txt")).unwrap(),
        "master\n"
    );
}

#[test]
fn cherry_pick_conflict_is_aborted() {
    let repo = TestRepo::new().with_conflicting_branches();
    run_git_failing(repo.path(), &["cherry-pick", "other"]);
    let git = repo.git();

    let state = git.state();
    assert!(
        state == vec![RepoState::Cherry] || state == vec![RepoState::CherrySequence],
        "unexpected state {state:?}"
    );
    git.reset_to_clean_state().unwrap();
    assert!(git.state().is_empty());
}

#[test]
fn rebase_conflict_is_aborted() {
    let repo = TestRepo::new().with_conflicting_branches();
    let before = repo.rev_parse("HEAD");
    run_git_failing(repo.path(), &["rebase", "other"]);
    let git = repo.git();

    let state = git.state();
    assert!(!state.is_empty());
    assert!(matches!(
        state.last(),
        Some(RepoState::Rebase | RepoState::RebaseMerge | RepoState::RebaseInteractive)
    ));

    git.reset_to_clean_state().unwrap();
    assert!(git.state().is_empty());
    assert_eq!(repo.rev_parse("HEAD"), before);
    assert_eq!(git.current_branch_name().unwrap(), "master");
}

#[test]
fn merge_inside_interactive_rebase_is_unwound() {
    let repo = TestRepo::new().with_conflicting_branches();
    let before = repo.rev_parse("HEAD");
    let git = repo
        .git()
        .with_env("GIT_SEQUENCE_EDITOR", "sed -i s+pick+edit+");

    git.execute_silent(&GitCommand::new(Subcommand::Rebase).flag("i").arg("HEAD~1"))
        .unwrap();
    assert_eq!(git.state(), vec![RepoState::RebaseInteractive]);

    let err = git
        .execute(&GitCommand::new(Subcommand::Merge).arg("other"))
        .unwrap_err();
    assert!(matches!(err, GitError::CommandFailed { .. }));
    assert_eq!(
        git.state(),
        vec![RepoState::Merge, RepoState::RebaseInteractive]
    );

    git.reset_to_clean_state().unwrap();
    assert!(git.state().is_empty());
    assert_eq!(repo.rev_parse("HEAD"), before);
    assert_eq!(git.current_branch_name().unwrap(), "master");
}

#[test]
fn bisect_is_not_unwound() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join(".git/BISECT_LOG"), "").unwrap();
    let git = repo.git();

    assert_eq!(git.state(), vec![RepoState::Bisect]);
    assert!(matches!(
        git.reset_to_clean_state(),
        Err(GitError::UnsupportedRepositoryState {
            state: RepoState::Bisect
        })
    ));
}
