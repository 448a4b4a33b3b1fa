//! state and abort commands - Inspect and unwind interrupted git operations

use crate::cli::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// Print in-progress operations, innermost first.
pub fn state(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repository()?;
    let states = repo.git().state();

    if states.is_empty() {
        output::print("No operation in progress", ctx.verbosity());
        return Ok(());
    }

    for state in states {
        println!("{}", state);
    }
    Ok(())
}

/// Abort in-progress operations until the repository is clean.
pub fn abort(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repository()?;
    let before = repo.git().state();

    if before.is_empty() {
        output::print("No operation in progress", ctx.verbosity());
        return Ok(());
    }

    repo.git()
        .reset_to_clean_state()
        .context("Failed to abort in-progress operation")?;

    let aborted: Vec<String> = before.iter().map(ToString::to_string).collect();
    output::print(
        format!("Aborted: {}", aborted.join(", ")),
        ctx.verbosity(),
    );
    Ok(())
}
