//! tracflow - ticket branches and change lists over git
//!
//! tracflow drives a ticket-oriented workflow on top of the git command
//! line: branches encode a ticket number, and the list of files changed
//! relative to a chosen base commit is computed by reconciling git's
//! history diff with its live status.
//!
//! # Architecture
//!
//! The codebase follows a strict layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, calls the façade)
//! - [`repository`] - Façade answering workflow questions about one repository
//! - [`core`] - Domain types, naming grammar, change reconciliation, config
//! - [`git`] - Single interface for all git operations
//! - [`ui`] - Console output
//!
//! # Correctness Invariants
//!
//! 1. Only [`git`] launches processes, and only from a fixed subcommand list
//! 2. No mutating git command runs without a configured committer identity
//! 3. Every path appears at most once in a change list, and live status wins
//! 4. Branch names outside the naming grammar are rejected, never guessed at

pub mod cli;
pub mod core;
pub mod git;
pub mod repository;
pub mod ui;
