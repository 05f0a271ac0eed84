//! Container command implementation: write the embedded image definition.

use crate::cli::{Args, Command, OutputManager};
use crate::container::write_container_recipe;
use crate::error::Result;

/// Execute the container command
pub(super) fn execute_container(args: &Args, output: &OutputManager) -> Result<()> {
    let Command::Container {
        target_dir,
        uid,
        package_version,
    } = &args.command
    else {
        unreachable!("execute_container called with non-Container command");
    };

    let path = write_container_recipe(target_dir, *uid, package_version.as_deref())?;
    let _ = output.info(&format!("Wrote container recipe to {}", path.display()));
    Ok(())
}
