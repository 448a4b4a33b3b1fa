//! core::types
//!
//! Strong types for core domain concepts.
//!
//! # Types
//!
//! - [`Sha1`] - Full 40-character commit object name
//!
//! # Validation
//!
//! These types enforce validity at construction time. Invalid values
//! cannot be represented, so every layer above can treat a `Sha1` as
//! trusted without re-checking it.
//!
//! # Examples
//!
//! ```
//! use tracflow::core::types::Sha1;
//!
//! let sha = Sha1::new("087e1fdd0fe6f4c596f5db22bc54567b032f5d2b").unwrap();
//! assert_eq!(sha.short(), "087e1f");
//!
//! // Invalid constructions fail at creation time
//! assert!(Sha1::new("not-a-sha").is_err());
//! assert!(Sha1::new("087E1FDD0FE6F4C596F5DB22BC54567B032F5D2B").is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from type validation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid sha1: {0}")]
    InvalidSha1(String),
}

/// A full SHA-1 object name.
///
/// Exactly 40 lowercase hexadecimal characters. Unlike abbreviated names
/// typed by a user, these come from plumbing output, so anything else
/// (uppercase, trailing whitespace, abbreviations) is rejected rather than
/// normalized.
///
/// # Example
///
/// ```
/// use tracflow::core::types::Sha1;
///
/// let sha = Sha1::new("72f6b86f1afc47b6a94ee5aa621839ec390fdc3c").unwrap();
/// assert_eq!(sha.as_str().len(), 40);
/// assert_eq!(sha.short(), "72f6b8");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Sha1(String);

impl Sha1 {
    /// Length of a full SHA-1 hex string.
    pub const LEN: usize = 40;

    /// Length of the abbreviated display form.
    pub const SHORT_LEN: usize = 6;

    /// Create a new validated object name.
    ///
    /// # Errors
    ///
    /// Returns `TypeError::InvalidSha1` unless the input is exactly 40
    /// lowercase hex characters.
    pub fn new(sha: impl Into<String>) -> Result<Self, TypeError> {
        let sha = sha.into();
        Self::validate(&sha)?;
        Ok(Self(sha))
    }

    fn validate(sha: &str) -> Result<(), TypeError> {
        if sha.len() != Self::LEN {
            return Err(TypeError::InvalidSha1(format!(
                "expected {} hex characters, got {} in {:?}",
                Self::LEN,
                sha.len(),
                sha
            )));
        }
        if !sha.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f')) {
            return Err(TypeError::InvalidSha1(format!(
                "expected lowercase hexadecimal, got {:?}",
                sha
            )));
        }
        Ok(())
    }

    /// The first six hex characters.
    pub fn short(&self) -> &str {
        &self.0[..Self::SHORT_LEN]
    }

    /// Get the object name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Sha1 {
    type Error = TypeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Sha1> for String {
    fn from(sha: Sha1) -> Self {
        sha.0
    }
}

impl AsRef<str> for Sha1 {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Sha1 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
