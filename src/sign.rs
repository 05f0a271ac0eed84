//! Deep code signing of the finished bundle (stage 7).
//!
//! Signing is the last stage by construction: any later edit to the bundle
//! would invalidate the signature. The signer itself is an external
//! collaborator; this module only invokes it.

use crate::cli::OutputManager;
use crate::error::SigningError;
use crate::process::run_streaming;
use crate::settings::Settings;
use std::path::Path;
use tokio::process::Command;

/// Deep-sign the bundle with the configured identity.
///
/// Deep signing covers every nested executable and library in the bundle
/// under the one identity. Fails on non-zero exit from the signer (identity
/// not found, keychain locked, nested binaries the signer rejects).
pub async fn sign_bundle(
    bundle: &Path,
    settings: &Settings,
    output: &OutputManager,
) -> std::result::Result<(), SigningError> {
    let identity = &settings.signing.identity;
    let _ = output.progress(&format!(
        "Signing {} with identity '{}'",
        bundle.display(),
        identity
    ));

    let mut signer = Command::new(&settings.tools.signer);
    signer
        .arg("--force")
        .arg("--deep")
        .arg("-s")
        .arg(identity)
        .arg(bundle);

    run_streaming(signer, "signing tool", output)
        .await
        .map_err(|f| SigningError::SignFailed {
            identity: identity.clone(),
            code: f.code,
            detail: f.detail,
        })?;

    log::info!("Signed {}", bundle.display());
    Ok(())
}
