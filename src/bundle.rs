//! Bundle packaging and entry-point injection (stages 4 and 5).

use crate::cli::OutputManager;
use crate::error::{CopyError, PackagingError};
use crate::process::run_streaming;
use crate::settings::Settings;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// Executable directory inside the bundle, relative to the bundle root
const EXECUTABLE_SUBDIR: &str = "Contents/MacOS";

/// Run the packaging tool against the spec file.
///
/// Invoked with forced overwrite, clean build, and windowed mode; the bundle
/// appears under the dist directory as a side effect. There is no pre-flight
/// check on the spec file: a missing spec surfaces as the packaging tool's
/// own non-zero exit.
pub async fn package(
    settings: &Settings,
    output: &OutputManager,
) -> std::result::Result<PathBuf, PackagingError> {
    let spec = settings.spec_path();
    let _ = output.progress(&format!("Packaging from spec {}", spec.display()));

    let mut packager = Command::new(&settings.tools.packager);
    packager
        .arg("--noconfirm")
        .arg("--clean")
        .arg("--windowed")
        .arg(&spec)
        .current_dir(&settings.project_dir);

    run_streaming(packager, "packaging tool", output)
        .await
        .map_err(|f| PackagingError::PackagingFailed {
            spec_file: spec.clone(),
            code: f.code,
            detail: f.detail,
        })?;

    let bundle = settings.bundle_path();
    if !bundle.is_dir() {
        return Err(PackagingError::BundleMissing { path: bundle });
    }
    Ok(bundle)
}

/// Copy the prebuilt entry-point binary into the bundle's executable
/// directory.
///
/// The destination directory must already exist (it is created by the
/// packaging stage); missing parents are an error, never created here. The
/// injected binary is made executable. Returns the hex SHA-256 of the
/// injected binary for the build report.
pub fn inject_entry_point(
    bundle: &Path,
    source: &Path,
) -> std::result::Result<String, CopyError> {
    if !source.is_file() {
        return Err(CopyError::SourceMissing {
            path: source.to_path_buf(),
        });
    }

    let dest_dir = bundle.join(EXECUTABLE_SUBDIR);
    if !dest_dir.is_dir() {
        return Err(CopyError::DestinationMissing { path: dest_dir });
    }

    let file_name = source.file_name().ok_or_else(|| CopyError::SourceMissing {
        path: source.to_path_buf(),
    })?;
    let dest = dest_dir.join(file_name);

    let contents = std::fs::read(source).map_err(|e| CopyError::CopyFailed {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;

    std::fs::write(&dest, &contents).map_err(|e| CopyError::CopyFailed {
        from: source.to_path_buf(),
        to: dest.clone(),
        source: e,
    })?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).map_err(|e| {
            CopyError::CopyFailed {
                from: source.to_path_buf(),
                to: dest.clone(),
                source: e,
            }
        })?;
    }

    let mut hasher = Sha256::new();
    hasher.update(&contents);
    Ok(format!("{:x}", hasher.finalize()))
}
