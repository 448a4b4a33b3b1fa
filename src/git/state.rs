//! git::state
//!
//! Detection and unwinding of interrupted operations.
//!
//! State is read from marker files under the metadata directory, in the
//! order the operations nest. [`detect`] returns the markers innermost
//! first, so aborting them front to back unwinds a merge started inside an
//! interactive rebase before the rebase itself.

use std::path::Path;

use serde::Serialize;
use tracing::debug;

use super::error::GitError;
use super::interface::Git;
use super::runner::{GitCommand, Subcommand};

/// One in-progress operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum RepoState {
    /// `rebase-apply/rebasing`
    #[serde(rename = "rebase")]
    Rebase,
    /// `rebase-apply/applying`
    #[serde(rename = "am")]
    Am,
    /// `rebase-merge/interactive`
    #[serde(rename = "rebase-i")]
    RebaseInteractive,
    /// `rebase-merge/` without the interactive marker
    #[serde(rename = "rebase-m")]
    RebaseMerge,
    /// `MERGE_HEAD`
    #[serde(rename = "merge")]
    Merge,
    /// `BISECT_LOG`
    #[serde(rename = "bisect")]
    Bisect,
    /// `CHERRY_PICK_HEAD` with a `sequencer/` directory
    #[serde(rename = "cherry-seq")]
    CherrySequence,
    /// `CHERRY_PICK_HEAD`
    #[serde(rename = "cherry")]
    Cherry,
}

impl RepoState {
    /// The state token.
    pub fn as_str(self) -> &'static str {
        match self {
            RepoState::Rebase => "rebase",
            RepoState::Am => "am",
            RepoState::RebaseInteractive => "rebase-i",
            RepoState::RebaseMerge => "rebase-m",
            RepoState::Merge => "merge",
            RepoState::Bisect => "bisect",
            RepoState::CherrySequence => "cherry-seq",
            RepoState::Cherry => "cherry",
        }
    }

    /// The command that leaves this state, or `None` if unwinding it is
    /// unsupported.
    fn abort_command(self) -> Option<GitCommand> {
        let sub = match self {
            RepoState::Rebase | RepoState::RebaseInteractive | RepoState::RebaseMerge => {
                Subcommand::Rebase
            }
            RepoState::Am => Subcommand::Am,
            RepoState::Merge => Subcommand::Merge,
            RepoState::CherrySequence | RepoState::Cherry => Subcommand::CherryPick,
            RepoState::Bisect => return None,
        };
        Some(GitCommand::new(sub).flag("abort"))
    }
}

impl std::fmt::Display for RepoState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read the in-progress operations under `git_dir`, innermost first.
///
/// # Example
///
/// ```
/// use tracflow::git::{detect_state, RepoState};
///
/// let dir = tempfile::TempDir::new().unwrap();
/// std::fs::write(dir.path().join("MERGE_HEAD"), "").unwrap();
/// assert_eq!(detect_state(dir.path()), vec![RepoState::Merge]);
/// ```
pub fn detect(git_dir: &Path) -> Vec<RepoState> {
    let mut found = Vec::new();

    let apply_dirs = [
        git_dir.join("rebase-apply"),
        git_dir.join("rebase"),
        git_dir.join("../.dotest"),
    ];
    for dir in apply_dirs.iter().filter(|d| d.is_dir()) {
        if dir.join("rebasing").is_file() && !found.contains(&RepoState::Rebase) {
            found.push(RepoState::Rebase);
        }
        if dir.join("applying").is_file() && !found.contains(&RepoState::Am) {
            found.push(RepoState::Am);
        }
    }

    let merge_dirs = [git_dir.join("rebase-merge"), git_dir.join(".dotest-merge")];
    if merge_dirs.iter().any(|d| d.join("interactive").is_file()) {
        found.push(RepoState::RebaseInteractive);
    } else if merge_dirs.iter().any(|d| d.is_dir()) {
        found.push(RepoState::RebaseMerge);
    }

    if git_dir.join("MERGE_HEAD").is_file() {
        found.push(RepoState::Merge);
    }
    if git_dir.join("BISECT_LOG").is_file() {
        found.push(RepoState::Bisect);
    }
    if git_dir.join("CHERRY_PICK_HEAD").is_file() {
        if git_dir.join("sequencer").is_dir() {
            found.push(RepoState::CherrySequence);
        } else {
            found.push(RepoState::Cherry);
        }
    }

    found.reverse();
    found
}

impl Git {
    /// In-progress operations, innermost first. Empty when clean.
    pub fn state(&self) -> Vec<RepoState> {
        detect(self.git_dir())
    }

    /// Abort in-progress operations until none remain.
    ///
    /// # Errors
    ///
    /// - [`GitError::UnsupportedRepositoryState`] on a bisect, before any
    ///   cleanup of that state is attempted
    /// - [`GitError::StateNotCleared`] if an abort succeeds but leaves the
    ///   same operation innermost
    /// - [`GitError::CommandFailed`] if an abort command fails
    pub fn reset_to_clean_state(&self) -> Result<(), GitError> {
        let mut states = self.state();
        while let Some(&innermost) = states.first() {
            let abort = innermost
                .abort_command()
                .ok_or(GitError::UnsupportedRepositoryState { state: innermost })?;
            debug!(state = %innermost, "aborting in-progress operation");
            self.execute_silent(&abort)?;

            states = self.state();
            if states.first() == Some(&innermost) {
                return Err(GitError::StateNotCleared { state: innermost });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(dir: &Path, rel: &str) {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "").unwrap();
    }

    #[test]
    fn clean_dir_has_no_state() {
        let dir = TempDir::new().unwrap();
        assert!(detect(dir.path()).is_empty());
    }

    #[test]
    fn merge_inside_interactive_rebase_is_innermost_first() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "rebase-merge/interactive");
        touch(dir.path(), "MERGE_HEAD");
        assert_eq!(
            detect(dir.path()),
            vec![RepoState::Merge, RepoState::RebaseInteractive]
        );
    }

    #[test]
    fn interactive_marker_suppresses_plain_rebase_merge() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), ".dotest-merge/interactive");
        fs::create_dir_all(dir.path().join("rebase-merge")).unwrap();
        assert_eq!(detect(dir.path()), vec![RepoState::RebaseInteractive]);
    }

    #[test]
    fn rebase_merge_directory_alone() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("rebase-merge")).unwrap();
        assert_eq!(detect(dir.path()), vec![RepoState::RebaseMerge]);
    }

    #[test]
    fn rebase_apply_markers() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "rebase-apply/rebasing");
        assert_eq!(detect(dir.path()), vec![RepoState::Rebase]);

        let dir = TempDir::new().unwrap();
        touch(dir.path(), "rebase-apply/applying");
        assert_eq!(detect(dir.path()), vec![RepoState::Am]);
    }

    #[test]
    fn cherry_pick_with_and_without_sequencer() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "CHERRY_PICK_HEAD");
        assert_eq!(detect(dir.path()), vec![RepoState::Cherry]);

        fs::create_dir_all(dir.path().join("sequencer")).unwrap();
        assert_eq!(detect(dir.path()), vec![RepoState::CherrySequence]);
    }

    #[test]
    fn all_markers_reverse_detection_order() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "rebase-apply/rebasing");
        touch(dir.path(), "rebase-merge/interactive");
        touch(dir.path(), "MERGE_HEAD");
        touch(dir.path(), "BISECT_LOG");
        touch(dir.path(), "CHERRY_PICK_HEAD");
        let tokens: Vec<&str> = detect(dir.path()).into_iter().map(RepoState::as_str).collect();
        assert_eq!(tokens, ["cherry", "bisect", "merge", "rebase-i", "rebase"]);
    }

    #[test]
    fn bisect_has_no_abort_command() {
        assert!(RepoState::Bisect.abort_command().is_none());
        assert_eq!(
            RepoState::RebaseInteractive
                .abort_command()
                .unwrap()
                .to_argv(),
            ["rebase", "--abort"]
        );
        assert_eq!(
            RepoState::CherrySequence.abort_command().unwrap().to_argv(),
            ["cherry-pick", "--abort"]
        );
    }
}
