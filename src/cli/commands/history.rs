//! history command - Commits of a branch since the baseline

use crate::cli::Context;
use anyhow::{Context as _, Result};

/// Print a branch's commits newest first, ending with the baseline tip.
pub fn history(ctx: &Context, branch: Option<&str>) -> Result<()> {
    let repo = ctx.open_repository()?;

    let branch = match branch {
        Some(name) => repo.get_branch(name)?,
        None => repo.current_branch()?,
    };
    let tip = branch
        .commit(repo.git())
        .with_context(|| format!("Branch '{}' does not exist", branch.full_name()))?
        .clone();

    for commit in repo.history(&tip)? {
        println!("{} {}", commit.short_sha1(), commit.title().unwrap_or(""));
    }
    Ok(())
}
