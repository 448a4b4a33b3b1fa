//! core::config::schema
//!
//! Configuration schema types.
//!
//! # Global Config
//!
//! Located at (first hit wins):
//! 1. `$TRACFLOW_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/tracflow/config.toml`
//! 3. `~/.tracflow/config.toml`
//!
//! # Repo Config
//!
//! Located at `<git-dir>/tracflow/config.toml`.

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Global configuration (user scope).
///
/// # Example
///
/// ```toml
/// git_cmd = "/usr/local/bin/git"
/// verbose = false
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct GlobalConfig {
    /// git executable (default: "git")
    pub git_cmd: Option<String>,

    /// Log every git invocation
    pub verbose: Option<bool>,
}

impl GlobalConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(cmd) = &self.git_cmd {
            if cmd.trim().is_empty() {
                return Err(ConfigError::InvalidValue(
                    "git_cmd cannot be empty".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// Repository configuration.
///
/// # Example
///
/// ```toml
/// prefix = "sageui/"
/// no_ticket_prefix = "sageui/none/"
/// remote = "trac"
/// baseline = "master"
/// history_limit = 20
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct RepoConfig {
    /// Managed branch prefix (default: "ticket/")
    pub prefix: Option<String>,

    /// Prefix for managed branches without a ticket (default: "<prefix>none/")
    pub no_ticket_prefix: Option<String>,

    /// Ticket server remote fetched from on checkout (default: "trac")
    pub remote: Option<String>,

    /// Branch used as the oldest history entry (default: "master")
    pub baseline: Option<String>,

    /// Maximum number of history entries (default: 20)
    pub history_limit: Option<usize>,
}

impl RepoConfig {
    /// Validate the configuration values.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if any value is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(prefix) = &self.prefix {
            if prefix.is_empty() || !prefix.ends_with('/') {
                return Err(ConfigError::InvalidValue(format!(
                    "prefix '{}' must be non-empty and end with '/'",
                    prefix
                )));
            }
        }

        if let Some(no_ticket) = &self.no_ticket_prefix {
            let prefix = self.prefix.as_deref().unwrap_or(super::DEFAULT_PREFIX);
            if !no_ticket.starts_with(prefix) || !no_ticket.ends_with('/') || no_ticket == prefix
            {
                return Err(ConfigError::InvalidValue(format!(
                    "no_ticket_prefix '{}' must extend '{}' and end with '/'",
                    no_ticket, prefix
                )));
            }

            // A numeric segment would shadow real ticket branches.
            let segment = no_ticket[prefix.len()..].split('/').next().unwrap_or_default();
            if !segment.is_empty() && segment.bytes().all(|b| b.is_ascii_digit()) {
                return Err(ConfigError::InvalidValue(format!(
                    "no_ticket_prefix '{}' cannot use ticket number '{}'",
                    no_ticket, segment
                )));
            }
        }

        for (key, value) in [("remote", &self.remote), ("baseline", &self.baseline)] {
            if value.as_deref().is_some_and(|v| v.trim().is_empty()) {
                return Err(ConfigError::InvalidValue(format!("{key} cannot be empty")));
            }
        }

        if self.history_limit == Some(0) {
            return Err(ConfigError::InvalidValue(
                "history_limit must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}
