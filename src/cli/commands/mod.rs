//! cli::commands
//!
//! Command dispatch and handlers.
//!
//! # Architecture
//!
//! Each command handler:
//! 1. Opens the repository through the [`Context`]
//! 2. Calls the [`crate::repository::Repository`] façade
//! 3. Formats and displays output
//!
//! Data goes to stdout; status messages are suppressed by `--quiet`.

mod branches;
mod changes;
mod checkout;
mod clean;
mod completion;
mod history;
mod recovery;

pub use branches::{branches, current};
pub use changes::changes;
pub use checkout::checkout;
pub use clean::clean;
pub use completion::completion;
pub use history::history;
pub use recovery::{abort, state};

use crate::cli::args::Command;
use crate::cli::Context;
use anyhow::Result;

/// Dispatch a command to its handler.
pub fn dispatch(command: Command, ctx: &Context) -> Result<()> {
    match command {
        Command::Changes { base, json } => changes::changes(ctx, base.as_deref(), json),
        Command::Branches { json } => branches::branches(ctx, json),
        Command::Current => branches::current(ctx),
        Command::Checkout { name, ticket } => checkout::checkout(ctx, &name, ticket),
        Command::History { branch } => history::history(ctx, branch.as_deref()),
        Command::State => recovery::state(ctx),
        Command::Abort => recovery::abort(ctx),
        Command::Clean {
            untracked,
            directories,
            ignored,
        } => clean::clean(ctx, untracked, directories, ignored),
        Command::Completion { shell } => completion::completion(shell),
    }
}
