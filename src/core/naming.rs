//! core::naming
//!
//! The managed-branch naming grammar.
//!
//! Managed branches are named `<prefix><ticket-or-none>/<description>`,
//! e.g. `ticket/1001/u/bob/work` or `ticket/none/u/user/description`.
//! The description may itself contain `/`. Names without any `/` are plain
//! local branches. Anything else is rejected rather than guessed at.
//!
//! # Example
//!
//! ```
//! use tracflow::core::naming::{BranchNaming, ParsedName};
//!
//! let naming = BranchNaming::new("sageui/");
//! assert_eq!(
//!     naming.parse("sageui/1001/u/bob/work").unwrap(),
//!     ParsedName::Managed { ticket: Some(1001), description: "u/bob/work".into() }
//! );
//! assert_eq!(naming.parse("my_branch").unwrap(), ParsedName::Local("my_branch".into()));
//! assert_eq!(naming.format(None, "u/user/description"), "sageui/none/u/user/description");
//! ```

use crate::git::GitError;

/// Ticket token used for managed branches without a ticket.
pub const NO_TICKET: &str = "none";

/// Result of parsing a raw branch name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName {
    /// A bare name outside the convention.
    Local(String),
    /// A name following the convention.
    Managed {
        ticket: Option<u64>,
        description: String,
    },
}

/// Prefix configuration for the naming grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchNaming {
    prefix: String,
    no_ticket_prefix: String,
}

impl BranchNaming {
    /// Grammar with the default no-ticket prefix, `<prefix>none/`.
    pub fn new(prefix: impl Into<String>) -> Self {
        let prefix = prefix.into();
        let no_ticket_prefix = format!("{prefix}{NO_TICKET}/");
        Self {
            prefix,
            no_ticket_prefix,
        }
    }

    /// Grammar with an explicit no-ticket prefix.
    pub fn with_no_ticket_prefix(
        prefix: impl Into<String>,
        no_ticket_prefix: impl Into<String>,
    ) -> Self {
        Self {
            prefix: prefix.into(),
            no_ticket_prefix: no_ticket_prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn no_ticket_prefix(&self) -> &str {
        &self.no_ticket_prefix
    }

    /// Parse a raw branch name (without `refs/heads/`).
    ///
    /// # Errors
    ///
    /// [`GitError::UnparsableBranchName`] if the name contains `/` but does
    /// not follow the convention, the ticket token is not a number, or the
    /// description is empty.
    pub fn parse(&self, raw: &str) -> Result<ParsedName, GitError> {
        if !raw.contains('/') {
            return Ok(ParsedName::Local(raw.to_string()));
        }

        if let Some(description) = raw.strip_prefix(self.no_ticket_prefix.as_str()) {
            return Ok(ParsedName::Managed {
                ticket: None,
                description: non_empty(raw, description)?,
            });
        }

        let rest = raw
            .strip_prefix(self.prefix.as_str())
            .ok_or_else(|| unparsable(raw, format!("does not start with {:?}", self.prefix)))?;
        let (token, description) = rest
            .split_once('/')
            .ok_or_else(|| unparsable(raw, "missing description after ticket"))?;
        let ticket = parse_ticket(token)
            .ok_or_else(|| unparsable(raw, format!("ticket {token:?} is not a number")))?;

        Ok(ParsedName::Managed {
            ticket: Some(ticket),
            description: non_empty(raw, description)?,
        })
    }

    /// Build the full branch name; the exact inverse of [`Self::parse`].
    pub fn format(&self, ticket: Option<u64>, description: &str) -> String {
        match ticket {
            Some(n) => format!("{}{}/{}", self.prefix, n, description),
            None => format!("{}{}", self.no_ticket_prefix, description),
        }
    }
}

/// Ticket token as shown to users: the number, or `none`.
pub fn ticket_string(ticket: Option<u64>) -> String {
    ticket.map_or_else(|| NO_TICKET.to_string(), |n| n.to_string())
}

fn parse_ticket(token: &str) -> Option<u64> {
    if token.is_empty() || !token.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    token.parse().ok()
}

fn non_empty(raw: &str, description: &str) -> Result<String, GitError> {
    if description.is_empty() {
        return Err(unparsable(raw, "empty description"));
    }
    Ok(description.to_string())
}

fn unparsable(raw: &str, reason: impl Into<String>) -> GitError {
    GitError::UnparsableBranchName {
        name: raw.to_string(),
        reason: reason.into(),
    }
}
