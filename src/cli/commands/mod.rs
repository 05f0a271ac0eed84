//! Command execution and dispatch.

mod build;
mod container;
mod validate;

use crate::cli::{Args, Command, OutputManager};
use crate::error::Result;

use build::execute_build;
use container::execute_container;
use validate::execute_validate;

/// Execute the parsed command and return the process exit code
pub async fn execute_command(args: Args) -> Result<i32> {
    if let Err(validation_error) = args.validate() {
        // Validation errors are never silenced
        let output = OutputManager::new(false, false);
        output.error(&format!("Invalid arguments: {}", validation_error));
        return Ok(1);
    }

    let output = OutputManager::new(args.verbose, args.quiet);

    match &args.command {
        Command::Build { .. } => {
            // Build owns its exit code: on pipeline failure it propagates the
            // failing tool's code rather than a generic 1.
            match execute_build(&args, &output).await {
                Ok(exit_code) => Ok(exit_code),
                Err(e) => {
                    output.error(&format!("Command 'build' failed: {}", e));
                    if output.is_verbose() {
                        print_suggestions(&output, &e);
                    }
                    Ok(e.exit_code())
                }
            }
        }
        Command::Container { .. } | Command::Validate { .. } => {
            let result = match &args.command {
                Command::Container { .. } => execute_container(&args, &output),
                Command::Validate { .. } => execute_validate(&args, &output),
                Command::Build { .. } => unreachable!(),
            };

            match result {
                Ok(()) => {
                    let _ = output.success(&format!(
                        "Command '{}' completed successfully",
                        args.command.name()
                    ));
                    Ok(0)
                }
                Err(e) => {
                    output.error(&format!("Command '{}' failed: {}", args.command.name(), e));
                    if output.is_verbose() {
                        print_suggestions(&output, &e);
                    }
                    Ok(1)
                }
            }
        }
    }
}

fn print_suggestions(output: &OutputManager, error: &crate::error::PipelineError) {
    let suggestions = error.recovery_suggestions();
    if !suggestions.is_empty() {
        let _ = output.println("\nRecovery suggestions:");
        for suggestion in suggestions {
            let _ = output.println(&format!("  • {}", suggestion));
        }
    }
}
