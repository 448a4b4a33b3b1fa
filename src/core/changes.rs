//! core::changes
//!
//! Reconciling history diffs with live working-tree status.
//!
//! git reports "what changed since the base commit" through two outputs that
//! do not always agree: `git diff --numstat -z <base>` (line counts against
//! the work tree) and `git status -z` (porcelain index/work-tree status).
//! [`resolve`] folds them into one list, one entry per path, sorted by path.
//!
//! Precedence: live status wins. A path touched in history and currently
//! staged is reported once, as [`ChangedFile::Staged`], keeping the counts
//! from the diff. An untracked path replaces whatever the diff said.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::commit::Commit;
use crate::git::GitError;

/// Line counts for one path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileDiff {
    pub path: String,
    pub added: u64,
    pub removed: u64,
    /// Binary files have no line counts; both are zero.
    pub binary: bool,
    /// The commit the counts are relative to.
    pub commit: Commit,
}

/// Line counts between two commits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RangeDiff {
    pub path: String,
    pub added: u64,
    pub removed: u64,
    pub binary: bool,
    pub from: Commit,
    pub to: Commit,
}

/// One changed path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangedFile {
    /// Changed relative to the base, with no live index/work-tree status.
    Committed(FileDiff),
    /// Has changes in the index.
    Staged(FileDiff),
    /// Has changes in the work tree not yet in the index.
    Unstaged(FileDiff),
    /// Not tracked and not ignored.
    Untracked { path: String },
    /// Changed between two commits.
    Range(RangeDiff),
}

impl ChangedFile {
    pub fn path(&self) -> &str {
        match self {
            ChangedFile::Committed(d) | ChangedFile::Staged(d) | ChangedFile::Unstaged(d) => {
                &d.path
            }
            ChangedFile::Untracked { path } => path,
            ChangedFile::Range(d) => &d.path,
        }
    }

    /// Short type tag: `diff`, `staged`, `unstaged`, `untracked`, `diff_index`.
    pub fn kind(&self) -> &'static str {
        match self {
            ChangedFile::Committed(_) => "diff",
            ChangedFile::Staged(_) => "staged",
            ChangedFile::Unstaged(_) => "unstaged",
            ChangedFile::Untracked { .. } => "untracked",
            ChangedFile::Range(_) => "diff_index",
        }
    }

    /// `(added, removed)`, or `None` for untracked and binary files.
    pub fn line_counts(&self) -> Option<(u64, u64)> {
        match self {
            ChangedFile::Committed(d) | ChangedFile::Staged(d) | ChangedFile::Unstaged(d) => {
                (!d.binary).then_some((d.added, d.removed))
            }
            ChangedFile::Range(d) => (!d.binary).then_some((d.added, d.removed)),
            ChangedFile::Untracked { .. } => None,
        }
    }

    pub fn is_binary(&self) -> bool {
        match self {
            ChangedFile::Committed(d) | ChangedFile::Staged(d) | ChangedFile::Unstaged(d) => {
                d.binary
            }
            ChangedFile::Range(d) => d.binary,
            ChangedFile::Untracked { .. } => false,
        }
    }

    /// Consume into the diff payload, if this entry has one.
    fn into_file_diff(self) -> Option<FileDiff> {
        match self {
            ChangedFile::Committed(d) | ChangedFile::Staged(d) | ChangedFile::Unstaged(d) => {
                Some(d)
            }
            _ => None,
        }
    }
}

impl std::fmt::Display for ChangedFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line_counts() {
            Some((added, removed)) => {
                write!(f, "{}:+{}-{}:{}", self.kind(), added, removed, self.path())
            }
            None => write!(f, "{}:{}", self.kind(), self.path()),
        }
    }
}

/// One numstat record: `(added, removed, path)`, `None` counts for binary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumstatRecord {
    pub counts: Option<(u64, u64)>,
    pub path: String,
}

/// Parse `git diff --numstat -z` output.
///
/// Records are `<added>\t<removed>\t<path>\0`; renames are
/// `<added>\t<removed>\t\0<from>\0<to>\0` and report the destination.
/// An empty token ends the stream.
pub fn parse_numstat(raw: &str) -> Result<Vec<NumstatRecord>, GitError> {
    let mut records = Vec::new();
    let mut tokens = raw.split('\0');
    while let Some(token) = tokens.next() {
        if token.is_empty() {
            break;
        }
        let mut fields = token.splitn(3, '\t');
        let (added, removed, path) = match (fields.next(), fields.next(), fields.next()) {
            (Some(a), Some(r), Some(p)) => (a, r, p),
            _ => return Err(malformed("diff --numstat", token)),
        };

        let path = if path.is_empty() {
            let _from = tokens.next();
            match tokens.next() {
                Some(to) if !to.is_empty() => to,
                _ => return Err(malformed("diff --numstat", token)),
            }
        } else {
            path
        };

        let counts = match (added, removed) {
            ("-", "-") => None,
            (a, r) => Some((
                a.parse().map_err(|_| malformed("diff --numstat", token))?,
                r.parse().map_err(|_| malformed("diff --numstat", token))?,
            )),
        };

        records.push(NumstatRecord {
            counts,
            path: path.to_string(),
        });
    }
    Ok(records)
}

/// Reconcile a `diff --numstat -z <base>` stream with a `status -z` stream.
///
/// # Errors
///
/// - [`GitError::UnknownStatusCode`] for a status pair with both columns
///   blank, or a record too short to carry a path
/// - [`GitError::UnexpectedOutput`] for a malformed numstat record
///
/// # Example
///
/// ```
/// use tracflow::core::changes::resolve;
/// use tracflow::core::commit::Commit;
///
/// let base = Commit::parse("087e1fdd0fe6f4c596f5db22bc54567b032f5d2b").unwrap();
/// let files = resolve("2\t0\tfoo.txt\0", " M foo.txt\0?? new.txt\0\0", &base).unwrap();
/// let shown: Vec<String> = files.iter().map(|f| f.to_string()).collect();
/// assert_eq!(shown, ["unstaged:+2-0:foo.txt", "untracked:new.txt"]);
/// ```
pub fn resolve(numstat: &str, status: &str, base: &Commit) -> Result<Vec<ChangedFile>, GitError> {
    let mut files: BTreeMap<String, ChangedFile> = BTreeMap::new();

    for record in parse_numstat(numstat)? {
        let (added, removed) = record.counts.unwrap_or((0, 0));
        let diff = FileDiff {
            path: record.path.clone(),
            added,
            removed,
            binary: record.counts.is_none(),
            commit: base.clone(),
        };
        files.insert(record.path, ChangedFile::Committed(diff));
    }

    apply_status(&mut files, status, base)?;

    Ok(files.into_values().collect())
}

/// Overlay live status onto entries parsed from the diff.
fn apply_status(
    files: &mut BTreeMap<String, ChangedFile>,
    status: &str,
    base: &Commit,
) -> Result<(), GitError> {
    let mut tokens = status.split('\0');
    while let Some(token) = tokens.next() {
        if token.is_empty() {
            break;
        }
        let (code, path) = split_status(token)?;
        let mut columns = code.chars();
        let (index, worktree) = match (columns.next(), columns.next()) {
            (Some(i), Some(w)) => (i, w),
            _ => return Err(unknown_status(code, path)),
        };

        if matches!(index, 'R' | 'C') || matches!(worktree, 'R' | 'C') {
            // the original path follows as its own record
            tokens.next();
        }

        if index == '?' && worktree == '?' {
            files.insert(
                path.to_string(),
                ChangedFile::Untracked {
                    path: path.to_string(),
                },
            );
            continue;
        }

        let reclassify: fn(FileDiff) -> ChangedFile = if worktree != ' ' {
            ChangedFile::Unstaged
        } else if index != ' ' {
            ChangedFile::Staged
        } else {
            return Err(unknown_status(code, path));
        };

        let diff = match files.remove(path).and_then(ChangedFile::into_file_diff) {
            Some(diff) => diff,
            None => {
                debug!(path, status = code, "status entry without diff entry");
                FileDiff {
                    path: path.to_string(),
                    added: 0,
                    removed: 0,
                    binary: false,
                    commit: base.clone(),
                }
            }
        };
        files.insert(path.to_string(), reclassify(diff));
    }
    Ok(())
}

/// Split `XY PATH` into the two-character code and the path.
fn split_status(token: &str) -> Result<(&str, &str), GitError> {
    match (token.get(..2), token.get(3..)) {
        (Some(code), Some(path)) if !path.is_empty() && token.as_bytes()[2] == b' ' => {
            Ok((code, path))
        }
        _ => Err(unknown_status(token, "")),
    }
}

/// Parse `git diff --numstat -z <from> <to>` into range entries.
pub fn range_diff(numstat: &str, from: &Commit, to: &Commit) -> Result<Vec<ChangedFile>, GitError> {
    let mut files: Vec<ChangedFile> = parse_numstat(numstat)?
        .into_iter()
        .map(|record| {
            let (added, removed) = record.counts.unwrap_or((0, 0));
            ChangedFile::Range(RangeDiff {
                path: record.path,
                added,
                removed,
                binary: record.counts.is_none(),
                from: from.clone(),
                to: to.clone(),
            })
        })
        .collect();
    files.sort_by(|a, b| a.path().cmp(b.path()));
    Ok(files)
}

fn malformed(command: &str, record: &str) -> GitError {
    GitError::UnexpectedOutput {
        command: command.to_string(),
        detail: format!("malformed record {record:?}"),
    }
}

fn unknown_status(status: &str, path: &str) -> GitError {
    GitError::UnknownStatusCode {
        status: status.to_string(),
        path: path.to_string(),
    }
}
