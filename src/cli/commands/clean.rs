//! clean command - Discard uncommitted changes

use crate::cli::Context;
use crate::ui::output;
use anyhow::Result;

/// Reset tracked files, optionally removing untracked and ignored files.
pub fn clean(ctx: &Context, untracked: bool, directories: bool, ignored: bool) -> Result<()> {
    let repo = ctx.open_repository()?;
    repo.git()
        .reset_to_clean_working_directory(untracked, directories, ignored)?;

    output::print("Working directory is clean", ctx.verbosity());
    Ok(())
}
