//! Command line interface for the bundle builder.

mod args;
pub mod commands;
mod output;

pub use args::{Args, Command};
pub use commands::execute_command;
pub use output::OutputManager;

use crate::error::Result;

/// Main CLI entry point.
///
/// Returns the process exit code: 0 on success, the failing external tool's
/// exit code on a pipeline failure, 1 for everything else.
pub async fn run() -> Result<i32> {
    let args = Args::parse_args();
    execute_command(args).await
}
