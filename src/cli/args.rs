//! Command line argument parsing and validation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Build, package, and sign desktop application bundles
#[derive(Parser, Debug)]
#[command(
    name = "appbundler",
    version,
    about = "Deterministic build pipeline producing signed application bundles",
    long_about = "Runs a fixed seven-stage pipeline: extract the build version, \
fetch and build the bootloader toolchain, install it, package the bundle from \
a spec file, inject the entry-point binary, run the post-build hook, and \
deep-sign the result. The pipeline halts at the first failure and exits with \
the failing tool's exit code."
)]
pub struct Args {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all output except errors
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Show verbose output
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Top-level subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full build-and-sign pipeline
    Build {
        /// Project directory containing the source checkout
        #[arg(long, default_value = ".", value_name = "DIR")]
        project_dir: PathBuf,

        /// Settings file (default: appbundler.toml in the project directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// Override the packaging spec file
        #[arg(long, value_name = "FILE")]
        spec_file: Option<PathBuf>,

        /// Override the build-metadata file the version is read from
        #[arg(long, value_name = "FILE")]
        metadata_file: Option<PathBuf>,

        /// Override the prebuilt entry-point binary to inject
        #[arg(long, value_name = "FILE")]
        entry_point: Option<PathBuf>,

        /// Override the signing identity
        #[arg(long, value_name = "IDENTITY")]
        identity: Option<String>,

        /// Override the minimum OS deployment target
        #[arg(long, value_name = "VERSION")]
        deployment_target: Option<String>,

        /// Write a JSON build report to this path on success
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },

    /// Write the container image definition to a directory
    Container {
        /// Directory to write the Dockerfile into
        #[arg(long, default_value = ".", value_name = "DIR")]
        target_dir: PathBuf,

        /// User ID build argument
        #[arg(long, value_name = "UID")]
        uid: Option<u32>,

        /// Pinned package version build argument
        #[arg(long, value_name = "VERSION")]
        package_version: Option<String>,
    },

    /// Preflight checks: settings, input files, external tools
    Validate {
        /// Project directory containing the source checkout
        #[arg(long, default_value = ".", value_name = "DIR")]
        project_dir: PathBuf,

        /// Settings file (default: appbundler.toml in the project directory)
        #[arg(long, value_name = "FILE")]
        config: Option<PathBuf>,
    },
}

impl Command {
    /// Name of the subcommand for log and error messages
    pub fn name(&self) -> &'static str {
        match self {
            Command::Build { .. } => "build",
            Command::Container { .. } => "container",
            Command::Validate { .. } => "validate",
        }
    }
}

impl Args {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Validate arguments for consistency beyond what clap enforces
    pub fn validate(&self) -> Result<(), String> {
        match &self.command {
            Command::Build {
                config, report, ..
            } => {
                if let Some(config) = config
                    && !config.exists()
                {
                    return Err(format!("Config file not found: {}", config.display()));
                }
                if let Some(report) = report
                    && let Some(parent) = report.parent()
                    && !parent.as_os_str().is_empty()
                    && !parent.is_dir()
                {
                    return Err(format!(
                        "Report directory does not exist: {}",
                        parent.display()
                    ));
                }
            }
            Command::Container { package_version, .. } => {
                if let Some(version) = package_version
                    && version.trim().is_empty()
                {
                    return Err("Package version must not be empty".to_string());
                }
            }
            Command::Validate { config, .. } => {
                if let Some(config) = config
                    && !config.exists()
                {
                    return Err(format!("Config file not found: {}", config.display()));
                }
            }
        }
        Ok(())
    }
}
