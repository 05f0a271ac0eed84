//! Error types for the bundle build pipeline.
//!
//! One sub-enum per pipeline stage, aggregated under [`PipelineError`]. Every
//! variant that wraps an external tool failure carries the tool's exit code and
//! captured output so the CLI can propagate the original exit code.

use crate::pipeline::Stage;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Main error type for all pipeline operations
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Version extraction errors
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Toolchain clone/build errors
    #[error("Toolchain build error: {0}")]
    ToolchainBuild(#[from] ToolchainBuildError),

    /// Toolchain installation errors
    #[error("Install error: {0}")]
    Install(#[from] InstallError),

    /// Bundle packaging errors
    #[error("Packaging error: {0}")]
    Packaging(#[from] PackagingError),

    /// Entry-point injection errors
    #[error("Copy error: {0}")]
    Copy(#[from] CopyError),

    /// Code signing errors
    #[error("Signing error: {0}")]
    Signing(#[from] SigningError),

    /// CLI argument errors
    #[error("CLI error: {0}")]
    Cli(#[from] CliError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing errors
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Generic errors from anyhow
    #[error("{0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Version extraction errors (stage 1)
#[derive(Error, Debug)]
pub enum ParseError {
    /// Metadata file does not exist or cannot be read
    #[error("Metadata file not found at {path}: {reason}")]
    MetadataMissing {
        /// Path where the metadata file was expected
        path: PathBuf,
        /// Underlying IO failure
        reason: String,
    },

    /// Metadata file contains no numeric version token
    #[error("No numeric version token found in {path}")]
    NoVersionToken {
        /// Path to the metadata file
        path: PathBuf,
    },
}

/// Toolchain clone/build errors (stage 2)
#[derive(Error, Debug)]
pub enum ToolchainBuildError {
    /// Cloning the toolchain repository failed
    #[error("Failed to clone '{repo}' at branch '{branch}': {detail}")]
    CloneFailed {
        /// Repository URL
        repo: String,
        /// Branch that was requested
        branch: String,
        /// Exit code of the clone tool, if it ran
        code: Option<i32>,
        /// Captured tool output or launch failure
        detail: String,
    },

    /// Building the bootloader failed
    #[error("Bootloader build failed in {dir}: {detail}")]
    BuildFailed {
        /// Directory the build ran in
        dir: PathBuf,
        /// Exit code of the build tool, if it ran
        code: Option<i32>,
        /// Captured tool output or launch failure
        detail: String,
    },
}

/// Toolchain installation errors (stage 3)
#[derive(Error, Debug)]
pub enum InstallError {
    /// The built toolchain checkout is not where the build left it
    #[error("Toolchain artifact not found at {path}")]
    ArtifactNotFound {
        /// Expected checkout location
        path: PathBuf,
    },

    /// The package installer exited non-zero
    #[error("Toolchain install failed: {detail}")]
    InstallFailed {
        /// Exit code of the installer, if it ran
        code: Option<i32>,
        /// Captured tool output or launch failure
        detail: String,
    },
}

/// Bundle packaging errors (stage 4)
#[derive(Error, Debug)]
pub enum PackagingError {
    /// The packaging tool exited non-zero
    #[error("Packaging tool failed for spec '{spec_file}': {detail}")]
    PackagingFailed {
        /// Spec file the packaging tool was given
        spec_file: PathBuf,
        /// Exit code of the packaging tool, if it ran
        code: Option<i32>,
        /// Captured tool output or launch failure
        detail: String,
    },

    /// The packaging tool exited zero but produced no bundle
    #[error("Packaging reported success but no bundle exists at {path}")]
    BundleMissing {
        /// Path where the bundle was expected
        path: PathBuf,
    },
}

/// Entry-point injection errors (stage 5)
#[derive(Error, Debug)]
pub enum CopyError {
    /// The prebuilt entry-point binary does not exist
    #[error("Entry-point binary not found at {path}")]
    SourceMissing {
        /// Path to the missing binary
        path: PathBuf,
    },

    /// The bundle's executable directory does not exist
    #[error("Bundle executable directory not found at {path}")]
    DestinationMissing {
        /// Path to the missing directory
        path: PathBuf,
    },

    /// The copy itself failed
    #[error("Failed to copy {from} to {to}: {source}")]
    CopyFailed {
        /// Source path
        from: PathBuf,
        /// Destination path
        to: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },
}

/// Code signing errors (stage 7)
#[derive(Error, Debug)]
pub enum SigningError {
    /// The signing tool exited non-zero
    #[error("Signing with identity '{identity}' failed: {detail}")]
    SignFailed {
        /// Signing identity that was requested
        identity: String,
        /// Exit code of the signer, if it ran
        code: Option<i32>,
        /// Captured tool output or launch failure
        detail: String,
    },
}

/// CLI-specific errors
#[derive(Error, Debug)]
pub enum CliError {
    /// Invalid command line arguments
    #[error("Invalid arguments: {reason}")]
    InvalidArguments {
        /// Reason for the error
        reason: String,
    },

    /// Command execution failed
    #[error("Command execution failed: {command} - {reason}")]
    ExecutionFailed {
        /// Command that failed
        command: String,
        /// Reason for the error
        reason: String,
    },

    /// Preflight validation found problems
    #[error("Validation failed: {failures} check(s) did not pass")]
    ValidationFailed {
        /// Number of failed checks
        failures: usize,
    },
}

impl PipelineError {
    /// The pipeline stage this error belongs to, if any.
    ///
    /// Ambient errors (IO, JSON, CLI) have no stage.
    pub fn stage(&self) -> Option<Stage> {
        match self {
            PipelineError::Parse(_) => Some(Stage::VersionExtraction),
            PipelineError::ToolchainBuild(_) => Some(Stage::ToolchainBuild),
            PipelineError::Install(_) => Some(Stage::ToolchainInstall),
            PipelineError::Packaging(_) => Some(Stage::Packaging),
            PipelineError::Copy(_) => Some(Stage::EntryPointInjection),
            PipelineError::Signing(_) => Some(Stage::Signing),
            _ => None,
        }
    }

    /// Process exit code to terminate with for this error.
    ///
    /// Propagates the failing external tool's exit code where one exists,
    /// falling back to 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        let tool_code = match self {
            PipelineError::ToolchainBuild(ToolchainBuildError::CloneFailed { code, .. })
            | PipelineError::ToolchainBuild(ToolchainBuildError::BuildFailed { code, .. })
            | PipelineError::Install(InstallError::InstallFailed { code, .. })
            | PipelineError::Packaging(PackagingError::PackagingFailed { code, .. })
            | PipelineError::Signing(SigningError::SignFailed { code, .. }) => *code,
            _ => None,
        };
        tool_code.unwrap_or(1)
    }

    /// Get actionable recovery suggestions for this error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PipelineError::Parse(ParseError::MetadataMissing { path, .. }) => vec![
                format!("Create a metadata file at {}", path.display()),
                "Point --metadata-file at the file containing the version token".to_string(),
            ],
            PipelineError::Parse(ParseError::NoVersionToken { .. }) => vec![
                "Add a numeric version token to the metadata file, e.g. 'Build 42'".to_string(),
            ],
            PipelineError::ToolchainBuild(ToolchainBuildError::CloneFailed { repo, .. }) => vec![
                format!("Check network access to {}", repo),
                "Verify the configured toolchain branch exists".to_string(),
            ],
            PipelineError::Install(InstallError::InstallFailed { .. }) => vec![
                "Check that the package installer can write to the active environment"
                    .to_string(),
                "Activate the intended virtual environment before building".to_string(),
            ],
            PipelineError::Packaging(PackagingError::PackagingFailed { spec_file, .. }) => vec![
                format!("Verify the spec file exists: {}", spec_file.display()),
                "Run the packaging tool manually to see its full output".to_string(),
            ],
            PipelineError::Copy(CopyError::SourceMissing { path }) => vec![
                format!("Build the entry-point binary first: {}", path.display()),
            ],
            PipelineError::Signing(SigningError::SignFailed { identity, .. }) => vec![
                format!("Verify the identity '{}' exists: security find-identity -v", identity),
                "Unlock the keychain holding the signing certificate".to_string(),
            ],
            _ => vec!["Check the error message above for specific details".to_string()],
        }
    }

    /// Check if this error is recoverable by re-running after a fix.
    ///
    /// Missing-input failures are not: the pipeline will fail the same way
    /// until the input itself changes.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            PipelineError::Parse(_)
                | PipelineError::Copy(CopyError::SourceMissing { .. })
                | PipelineError::Cli(CliError::InvalidArguments { .. })
        )
    }
}
