//! core::commit
//!
//! Commit value object.
//!
//! A [`Commit`] is resolved from a ref or parsed from log output and never
//! changes afterwards. Identity is the object name alone: two commits with
//! the same sha1 are equal even if only one of them carries a title.

use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::types::{Sha1, TypeError};

/// A commit, optionally with its one-line title.
///
/// # Example
///
/// ```
/// use tracflow::core::commit::Commit;
///
/// let a = Commit::parse("72f6b86f1afc47b6a94ee5aa621839ec390fdc3c").unwrap();
/// let b = a.clone().with_title("initial commit");
/// assert_eq!(a, b);
/// assert_eq!(b.short_sha1(), "72f6b8");
/// assert_eq!(b.title(), Some("initial commit"));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Commit {
    sha1: Sha1,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    title: Option<String>,
}

impl Commit {
    /// Create a commit from a validated object name.
    pub fn new(sha1: Sha1) -> Self {
        Self { sha1, title: None }
    }

    /// Create a commit from raw text.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSha1` unless `sha1` is exactly 40
    /// lowercase hex characters.
    pub fn parse(sha1: impl Into<String>) -> Result<Self, TypeError> {
        Ok(Self::new(Sha1::new(sha1)?))
    }

    /// Attach a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn sha1(&self) -> &Sha1 {
        &self.sha1
    }

    /// First six hex characters of the object name.
    pub fn short_sha1(&self) -> &str {
        self.sha1.short()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }
}

impl PartialEq for Commit {
    fn eq(&self, other: &Self) -> bool {
        self.sha1 == other.sha1
    }
}

impl Eq for Commit {}

impl PartialOrd for Commit {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Commit {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sha1.cmp(&other.sha1)
    }
}

impl Hash for Commit {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.sha1.hash(state);
    }
}

impl std::fmt::Display for Commit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Commit {}", self.short_sha1())
    }
}
