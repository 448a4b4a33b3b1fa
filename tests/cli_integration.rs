//! Integration tests for the `tf` binary.
//!
//! These run the real binary against repositories created via tempfile.

use std::path::Path;
use std::process::Command as StdCommand;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// Test fixture: a repository with one ticket branch checked out.
struct TestRepo {
    dir: TempDir,
}

impl TestRepo {
    fn new() -> Self {
        let dir = TempDir::new().expect("failed to create temp dir");
        let p = dir.path();
        run_git(p, &["init", "-q", "-b", "master"]);
        run_git(p, &["config", "user.email", "test@example.com"]);
        run_git(p, &["config", "user.name", "Test User"]);
        run_git(p, &["config", "commit.gpgsign", "false"]);

        std::fs::write(p.join("README.md"), "# Test Repo\n").unwrap();
        run_git(p, &["add", "README.md"]);
        run_git(p, &["commit", "-q", "-m", "Initial commit"]);

        run_git(p, &["checkout", "-q", "-b", "ticket/42/u/dev/feature"]);
        std::fs::write(p.join("feature.txt"), "one\ntwo\n").unwrap();
        run_git(p, &["add", "feature.txt"]);
        run_git(p, &["commit", "-q", "-m", "add feature"]);

        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The binary, run inside the repository with no user config.
    fn tf(&self) -> Command {
        let mut cmd = Command::cargo_bin("tf").unwrap();
        cmd.current_dir(self.path())
            .env("TRACFLOW_CONFIG", self.path().join("no-such-config.toml"))
            .env("XDG_CONFIG_HOME", self.path().join("no-such-xdg"))
            .env_remove("RUST_LOG");
        cmd
    }
}

fn run_git(dir: &Path, args: &[&str]) {
    let output = StdCommand::new("git")
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

#[test]
fn help_lists_commands() {
    Command::cargo_bin("tf")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("changes"))
        .stdout(predicate::str::contains("checkout"));
}

#[test]
fn changes_against_master() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("notes.txt"), "").unwrap();

    repo.tf()
        .args(["changes", "--base", "master"])
        .assert()
        .success()
        .stdout("diff:+2-0:feature.txt\nuntracked:notes.txt\n");
}

#[test]
fn changes_as_json() {
    let repo = TestRepo::new();
    let output = repo
        .tf()
        .args(["changes", "--base", "master", "--json"])
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let entries = value.as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["kind"], "committed");
    assert_eq!(entries[0]["path"], "feature.txt");
    assert_eq!(entries[0]["added"], 2);
}

#[test]
fn clean_tree_has_no_changes() {
    let repo = TestRepo::new();
    repo.tf()
        .arg("changes")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("No changes since"));

    repo.tf().args(["--quiet", "changes"]).assert().success().stdout("");
}

#[test]
fn current_branch_shows_ticket() {
    let repo = TestRepo::new();
    repo.tf()
        .arg("current")
        .assert()
        .success()
        .stdout(predicate::str::contains("42  ticket/42/u/dev/feature"));
}

#[test]
fn branches_marks_current() {
    let repo = TestRepo::new();
    repo.tf()
        .arg("branches")
        .assert()
        .success()
        .stdout(predicate::str::contains("* ").and(predicate::str::contains("ticket/42/u/dev/feature")))
        .stdout(predicate::str::contains("local  master"));
}

#[test]
fn branches_lists_from_unmanaged_checkout() {
    let repo = TestRepo::new();
    run_git(repo.path(), &["checkout", "-q", "-b", "feature/foo"]);

    repo.tf()
        .arg("branches")
        .assert()
        .success()
        .stdout(predicate::str::contains("ticket/42/u/dev/feature"))
        .stdout(predicate::str::contains("local  master"))
        .stdout(predicate::str::contains("feature/foo").not());
}

#[test]
fn history_lists_commits_and_baseline() {
    let repo = TestRepo::new();
    repo.tf()
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::is_match(r"^[0-9a-f]{6} add feature\n[0-9a-f]{6} \n$").unwrap());
}

#[test]
fn checkout_existing_branch() {
    let repo = TestRepo::new();
    repo.tf()
        .args(["checkout", "master"])
        .assert()
        .success()
        .stdout("Switched to branch 'master'\n");

    repo.tf()
        .args(["checkout", "u/dev/feature", "--ticket", "42"])
        .assert()
        .success()
        .stdout("Switched to branch 'ticket/42/u/dev/feature'\n");
}

#[test]
fn state_and_abort_on_clean_repo() {
    let repo = TestRepo::new();
    repo.tf()
        .arg("state")
        .assert()
        .success()
        .stdout("No operation in progress\n");
    repo.tf().arg("abort").assert().success();
}

#[test]
fn clean_discards_changes() {
    let repo = TestRepo::new();
    std::fs::write(repo.path().join("feature.txt"), "changed\n").unwrap();
    std::fs::write(repo.path().join("scratch.txt"), "").unwrap();

    repo.tf().args(["clean", "-u"]).assert().success();
    assert_eq!(
        std::fs::read_to_string(repo.path().join("feature.txt")).unwrap(),
        "one\ntwo\n"
    );
    assert!(!repo.path().join("scratch.txt").exists());
}

#[test]
fn repo_config_changes_prefix() {
    let repo = TestRepo::new();
    let config = repo.path().join(".git/tracflow/config.toml");
    std::fs::create_dir_all(config.parent().unwrap()).unwrap();
    std::fs::write(&config, "prefix = \"other/\"\n").unwrap();

    // The checked-out branch no longer follows the grammar.
    repo.tf()
        .arg("current")
        .assert()
        .failure()
        .stderr(predicate::str::contains("cannot parse branch name"));
}

#[test]
fn invalid_config_is_reported() {
    let repo = TestRepo::new();
    let config = repo.path().join(".git/tracflow/config.toml");
    std::fs::create_dir_all(config.parent().unwrap()).unwrap();
    std::fs::write(&config, "history_limit = 0\n").unwrap();

    repo.tf()
        .arg("changes")
        .assert()
        .failure()
        .stderr(predicate::str::starts_with("error: Failed to load configuration"));
}

#[test]
fn outside_repository_fails() {
    let dir = TempDir::new().unwrap();
    Command::cargo_bin("tf")
        .unwrap()
        .arg("--cwd")
        .arg(dir.path())
        .arg("state")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}

#[test]
fn completion_generates_script() {
    Command::cargo_bin("tf")
        .unwrap()
        .args(["completion", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_tf"));
}
