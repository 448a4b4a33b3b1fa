//! checkout command - Switch to a (ticket) branch

use crate::cli::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Check out a branch, fetching it from the ticket remote if it is missing.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `name` - Local name, or remote name of a ticket branch
/// * `ticket` - Ticket number for ticket branches
pub fn checkout(ctx: &Context, name: &str, ticket: Option<u64>) -> Result<()> {
    let repo = ctx.open_repository()?;
    let branch = repo
        .checkout_branch(name, ticket)
        .with_context(|| format!("Failed to check out '{}'", name))?;

    output::print(
        format!("Switched to branch '{}'", branch.full_name()),
        ctx.verbosity(),
    );
    Ok(())
}
