//! Bootloader toolchain acquisition and installation (stages 2 and 3).
//!
//! The packaging tool needs a launcher/bootloader built against the minimum
//! OS deployment target, so the pipeline clones the toolchain repository at a
//! fixed branch, builds the bootloader with the target expressed through
//! compiler and linker flags, and installs the result into the active build
//! environment.

use crate::cli::OutputManager;
use crate::error::{InstallError, ToolchainBuildError};
use crate::process::run_streaming;
use crate::settings::Settings;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Compiler/linker flag variables that carry the deployment target
const FLAG_VARS: [&str; 4] = ["CFLAGS", "CPPFLAGS", "LDFLAGS", "LINKFLAGS"];

/// Environment applied to the bootloader build.
///
/// Computed once before stage 2 and reused unchanged for every child spawned
/// by the toolchain stages: `MACOSX_DEPLOYMENT_TARGET` plus the four flag
/// variables, all pinned to the same deployment target.
pub fn deployment_env(target: &str) -> HashMap<String, String> {
    let mut env = HashMap::new();
    env.insert("MACOSX_DEPLOYMENT_TARGET".to_string(), target.to_string());
    for var in FLAG_VARS {
        env.insert(var.to_string(), format!("-mmacosx-version-min={target}"));
    }
    env
}

/// Clone the toolchain repository and build its bootloader.
///
/// The checkout is always fresh: an existing checkout directory is removed
/// first so a stale tree can never leak into the build. Returns the checkout
/// path for the install stage.
pub async fn fetch_and_build(
    settings: &Settings,
    env: &HashMap<String, String>,
    output: &OutputManager,
) -> std::result::Result<PathBuf, ToolchainBuildError> {
    let checkout = settings.checkout_path();

    if checkout.exists() {
        std::fs::remove_dir_all(&checkout).map_err(|e| ToolchainBuildError::CloneFailed {
            repo: settings.toolchain.repo_url.clone(),
            branch: settings.toolchain.branch.clone(),
            code: None,
            detail: format!("could not remove stale checkout: {e}"),
        })?;
    }

    let _ = output.progress(&format!(
        "Cloning {} (branch {})",
        settings.toolchain.repo_url, settings.toolchain.branch
    ));

    let mut clone = Command::new(&settings.tools.git);
    clone
        .arg("clone")
        .arg("--depth")
        .arg("1")
        .arg("--branch")
        .arg(&settings.toolchain.branch)
        .arg(&settings.toolchain.repo_url)
        .arg(&checkout);

    run_streaming(clone, "git clone", output).await.map_err(|f| {
        ToolchainBuildError::CloneFailed {
            repo: settings.toolchain.repo_url.clone(),
            branch: settings.toolchain.branch.clone(),
            code: f.code,
            detail: f.detail,
        }
    })?;

    let bootloader_dir = checkout.join("bootloader");
    let _ = output.progress(&format!(
        "Building bootloader for deployment target {}",
        settings.toolchain.deployment_target
    ));

    let mut build = Command::new(&settings.tools.python);
    build
        .arg("./waf")
        .arg("all")
        .current_dir(&bootloader_dir)
        .envs(env);

    run_streaming(build, "bootloader build", output)
        .await
        .map_err(|f| ToolchainBuildError::BuildFailed {
            dir: bootloader_dir.clone(),
            code: f.code,
            detail: f.detail,
        })?;

    Ok(checkout)
}

/// Install the built toolchain into the active build environment.
///
/// Resolves against the just-built checkout: if the checkout is gone the
/// install cannot proceed and fails without running the installer.
pub async fn install(
    checkout: &Path,
    settings: &Settings,
    output: &OutputManager,
) -> std::result::Result<(), InstallError> {
    if !checkout.exists() {
        return Err(InstallError::ArtifactNotFound {
            path: checkout.to_path_buf(),
        });
    }

    let _ = output.progress("Installing toolchain into build environment");

    let mut install = Command::new(&settings.tools.pip);
    install.arg("install").arg(checkout);

    run_streaming(install, "toolchain install", output)
        .await
        .map_err(|f| InstallError::InstallFailed {
            code: f.code,
            detail: f.detail,
        })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deployment_env_pins_every_variable() {
        let env = deployment_env("10.13");
        assert_eq!(env.len(), 5);
        assert_eq!(env["MACOSX_DEPLOYMENT_TARGET"], "10.13");
        for var in FLAG_VARS {
            assert_eq!(env[var], "-mmacosx-version-min=10.13");
        }
    }

    #[tokio::test]
    async fn install_requires_the_checkout() {
        let temp = tempfile::TempDir::new().expect("temp dir");
        let settings = Settings {
            project_dir: temp.path().to_path_buf(),
            ..Default::default()
        };
        let missing = temp.path().join("no-checkout");
        let output = OutputManager::new(false, true);

        match install(&missing, &settings, &output).await {
            Err(InstallError::ArtifactNotFound { path }) => assert_eq!(path, missing),
            other => panic!("expected ArtifactNotFound, got {other:?}"),
        }
    }
}
