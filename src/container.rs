//! Embedded container image definition.
//!
//! The recipe is embedded at compile time and written out by the `container`
//! command, so a deployment directory can be seeded without carrying the
//! source tree around. Pure configuration: a user ID build argument, a pinned
//! package version build argument, one volume, a working directory, and a
//! foreground startup command.

use crate::error::{CliError, PipelineError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Embedded container recipe for running the packaged application
const DOCKERFILE: &str = include_str!("container/Dockerfile");

/// Write the container recipe into a target directory.
///
/// `uid` and `package_version` fill the recipe's build arguments by rewriting
/// the `ARG` default lines; `None` keeps the embedded defaults. Returns the
/// path of the written Dockerfile.
pub fn write_container_recipe(
    target_dir: &Path,
    uid: Option<u32>,
    package_version: Option<&str>,
) -> Result<PathBuf> {
    fs::create_dir_all(target_dir).map_err(|e| {
        PipelineError::Cli(CliError::ExecutionFailed {
            command: "write_container_recipe".to_string(),
            reason: format!(
                "Failed to create target directory {}: {}",
                target_dir.display(),
                e
            ),
        })
    })?;

    let mut recipe = DOCKERFILE.to_string();
    if let Some(uid) = uid {
        recipe = rewrite_arg(&recipe, "UID", &uid.to_string());
    }
    if let Some(version) = package_version {
        recipe = rewrite_arg(&recipe, "VERSION", version);
    }

    let path = target_dir.join("Dockerfile");
    fs::write(&path, recipe).map_err(|e| {
        PipelineError::Cli(CliError::ExecutionFailed {
            command: "write_container_recipe".to_string(),
            reason: format!("Failed to write Dockerfile to {}: {}", path.display(), e),
        })
    })?;

    Ok(path)
}

/// Replace the default value of one `ARG NAME=value` line
fn rewrite_arg(recipe: &str, name: &str, value: &str) -> String {
    let prefix = format!("ARG {name}=");
    recipe
        .lines()
        .map(|line| {
            if line.starts_with(&prefix) {
                format!("ARG {name}={value}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
        + "\n"
}
