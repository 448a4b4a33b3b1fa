//! core::config
//!
//! Configuration schema and loading.
//!
//! # Overview
//!
//! Tracflow has two configuration scopes:
//! - **Global**: User-level settings (git executable, verbosity)
//! - **Repo**: Branch naming and workflow settings for one repository
//!
//! # Precedence
//!
//! Configuration values are resolved in this order (later overrides earlier):
//! 1. Default values
//! 2. Global config file
//! 3. Repo config file
//! 4. CLI flags (not handled here)
//!
//! # Global Config Locations
//!
//! Searched in order:
//! 1. `$TRACFLOW_CONFIG` if set
//! 2. `$XDG_CONFIG_HOME/tracflow/config.toml`
//! 3. `~/.tracflow/config.toml`
//!
//! # Repo Config Location
//!
//! `<git-dir>/tracflow/config.toml`
//!
//! The library itself never reads configuration; callers turn a loaded
//! [`Config`] into [`RepoSettings`] and hand that to the repository.
//!
//! # Example
//!
//! ```no_run
//! use tracflow::core::config::Config;
//! use std::path::Path;
//!
//! let config = Config::load(Some(Path::new("/path/to/repo/.git"))).unwrap();
//! let settings = config.repo_settings();
//! println!("Prefix: {}", settings.naming.prefix());
//! println!("Remote: {}", settings.remote);
//! ```

pub mod schema;

pub use schema::{GlobalConfig, RepoConfig};

use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::core::naming::BranchNaming;

/// Managed branch prefix when none is configured.
pub const DEFAULT_PREFIX: &str = "ticket/";
/// Ticket server remote when none is configured.
pub const DEFAULT_REMOTE: &str = "trac";
/// Baseline branch when none is configured.
pub const DEFAULT_BASELINE: &str = "master";
/// History length when none is configured.
pub const DEFAULT_HISTORY_LIMIT: usize = 20;

/// Errors from configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file '{path}': {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Repository settings with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoSettings {
    /// Managed branch grammar
    pub naming: BranchNaming,
    /// Remote fetched from when checking out a missing ticket branch
    pub remote: String,
    /// Branch used as the oldest history entry
    pub baseline: String,
    /// Maximum number of history entries
    pub history_limit: usize,
}

impl Default for RepoSettings {
    fn default() -> Self {
        Self {
            naming: BranchNaming::new(DEFAULT_PREFIX),
            remote: DEFAULT_REMOTE.to_string(),
            baseline: DEFAULT_BASELINE.to_string(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

/// Merged configuration from all sources.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Global configuration
    pub global: GlobalConfig,
    /// Repository configuration (if in a repo)
    pub repo: Option<RepoConfig>,
    /// Path to the global config file (if loaded)
    global_path: Option<PathBuf>,
    /// Path to the repo config file (if loaded)
    repo_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration from default locations.
    ///
    /// If `git_dir` is provided, also loads the repo config below it.
    ///
    /// # Errors
    ///
    /// Returns an error if config files exist but cannot be parsed or fail
    /// validation. Missing config files are not an error.
    pub fn load(git_dir: Option<&Path>) -> Result<Config, ConfigError> {
        let global_path = Self::find_global();
        Self::load_from(global_path.as_deref(), git_dir)
    }

    /// Load configuration from an explicit global file instead of searching.
    pub fn load_from(
        global_path: Option<&Path>,
        git_dir: Option<&Path>,
    ) -> Result<Config, ConfigError> {
        let global = match global_path {
            Some(path) if path.exists() => Self::read_config::<GlobalConfig>(path)?,
            _ => GlobalConfig::default(),
        };
        let global_path = global_path.filter(|p| p.exists()).map(Path::to_path_buf);

        let repo_path = git_dir
            .map(Self::repo_config_path)
            .filter(|p| p.exists());
        let repo = repo_path
            .as_deref()
            .map(Self::read_config::<RepoConfig>)
            .transpose()?;

        global.validate()?;
        if let Some(ref r) = repo {
            r.validate()?;
        }

        Ok(Config {
            global,
            repo,
            global_path,
            repo_path,
        })
    }

    /// First existing global config file, if any.
    fn find_global() -> Option<PathBuf> {
        // 1. Check $TRACFLOW_CONFIG
        if let Ok(path) = std::env::var("TRACFLOW_CONFIG") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        // 2. Check $XDG_CONFIG_HOME/tracflow/config.toml
        if let Ok(xdg_home) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_home).join("tracflow/config.toml");
            if path.exists() {
                return Some(path);
            }
        }

        // 3. Check ~/.tracflow/config.toml
        dirs::home_dir()
            .map(|home| home.join(".tracflow/config.toml"))
            .filter(|path| path.exists())
    }

    fn read_config<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Path of the repo config file for a metadata directory.
    pub fn repo_config_path(git_dir: &Path) -> PathBuf {
        git_dir.join("tracflow/config.toml")
    }

    // =========================================================================
    // Accessor methods with precedence
    // =========================================================================

    /// The git executable. Defaults to "git".
    pub fn git_cmd(&self) -> &str {
        self.global.git_cmd.as_deref().unwrap_or("git")
    }

    /// Whether git invocations are logged. Defaults to `false`.
    pub fn verbose(&self) -> bool {
        self.global.verbose.unwrap_or(false)
    }

    /// Repository settings with defaults applied.
    pub fn repo_settings(&self) -> RepoSettings {
        let defaults = RepoSettings::default();
        let Some(repo) = &self.repo else {
            return defaults;
        };

        let naming = match (&repo.prefix, &repo.no_ticket_prefix) {
            (prefix, Some(no_ticket)) => BranchNaming::with_no_ticket_prefix(
                prefix.as_deref().unwrap_or(DEFAULT_PREFIX),
                no_ticket.as_str(),
            ),
            (Some(prefix), None) => BranchNaming::new(prefix.as_str()),
            (None, None) => defaults.naming,
        };

        RepoSettings {
            naming,
            remote: repo.remote.clone().unwrap_or(defaults.remote),
            baseline: repo.baseline.clone().unwrap_or(defaults.baseline),
            history_limit: repo.history_limit.unwrap_or(defaults.history_limit),
        }
    }

    /// Get the path to the loaded global config file.
    pub fn global_config_loaded_from(&self) -> Option<&Path> {
        self.global_path.as_deref()
    }

    /// Get the path to the loaded repo config file.
    pub fn repo_config_loaded_from(&self) -> Option<&Path> {
        self.repo_path.as_deref()
    }
}
