//! changes command - List files changed since a base commit

use crate::cli::Context;
use crate::ui::output;
use anyhow::{Context as _, Result};

/// List changed files.
///
/// # Arguments
///
/// * `ctx` - Execution context
/// * `base` - Revision to compare against (default: HEAD)
/// * `json` - Print JSON instead of one line per file
pub fn changes(ctx: &Context, base: Option<&str>, json: bool) -> Result<()> {
    let repo = ctx.open_repository()?;

    let base = match base {
        Some(rev) => repo
            .set_base_ref(rev)
            .with_context(|| format!("Failed to resolve base revision '{}'", rev))?,
        None => repo.base_commit()?,
    };

    let files = repo.changes().context("Failed to compute changes")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&files)?);
        return Ok(());
    }

    if files.is_empty() {
        output::print(
            format!("No changes since {}", base.short_sha1()),
            ctx.verbosity(),
        );
        return Ok(());
    }

    for file in &files {
        println!("{}", file);
    }
    Ok(())
}
