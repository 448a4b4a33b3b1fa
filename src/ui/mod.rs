//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All console output goes through this module so that quiet mode is
//! honored consistently. Diagnostics go through `tracing` instead.

pub mod output;
