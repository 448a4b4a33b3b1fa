//! branches and current commands - Inspect local branches

use crate::cli::Context;
use crate::core::branch::Branch;
use crate::git::GitError;
use anyhow::Result;
use serde_json::json;

/// List local branches, oldest commit first.
pub fn branches(ctx: &Context, json: bool) -> Result<()> {
    let repo = ctx.open_repository()?;
    let branches = repo.local_branches()?;

    // Only the name is needed; HEAD may sit on a branch outside the grammar.
    // Detached HEAD just means nothing is marked current.
    let current = match repo.git().current_branch_name() {
        Ok(name) => Some(name),
        Err(GitError::DetachedHead) => None,
        Err(e) => return Err(e.into()),
    };

    if json {
        let entries: Vec<_> = branches
            .iter()
            .map(|b| {
                json!({
                    "name": b.name(),
                    "full_name": b.full_name(),
                    "managed": b.is_managed(),
                    "ticket": b.ticket(),
                    "commit": b.cached_commit().map(|c| c.sha1().as_str()),
                    "current": current.as_deref() == Some(b.full_name()),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for branch in &branches {
        let marker = if current.as_deref() == Some(branch.full_name()) {
            "*"
        } else {
            " "
        };
        println!("{} {}", marker, describe(branch));
    }
    Ok(())
}

/// Show the checked-out branch.
pub fn current(ctx: &Context) -> Result<()> {
    let repo = ctx.open_repository()?;
    let branch = repo.current_branch()?;
    let commit = branch.commit(repo.git())?;
    println!("{} ({})", describe(&branch), commit.short_sha1());
    Ok(())
}

/// `<ticket-label> <full-name> [<short-sha>]`
fn describe(branch: &Branch) -> String {
    let mut line = format!("{:>6}  {}", branch.ticket_label(), branch.full_name());
    if let Some(commit) = branch.cached_commit() {
        line.push_str(&format!("  {}", commit.short_sha1()));
    }
    line
}
