//! tf - ticket branches and change lists over git

use std::process::ExitCode;

fn main() -> ExitCode {
    match tracflow::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracflow::ui::output::error(format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}
