//! core
//!
//! Core domain types and logic for tracflow.
//!
//! # Modules
//!
//! - [`types`] - Strong types: Sha1
//! - [`commit`] - Commit value object
//! - [`naming`] - Managed branch naming grammar
//! - [`branch`] - Local and managed branches
//! - [`changes`] - Reconciliation of history diffs with live status
//! - [`config`] - Configuration schema and loading
//!
//! # Design Principles
//!
//! - Strong typing prevents invalid states at compile time
//! - Nothing here launches a process; git output arrives as strings
//! - All parsing is deterministic

pub mod branch;
pub mod changes;
pub mod commit;
pub mod config;
pub mod naming;
pub mod types;
