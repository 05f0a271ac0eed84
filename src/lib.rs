//! # appbundler
//!
//! Deterministic build-and-release pipeline for producing a signed, versioned
//! desktop application bundle from a source checkout.
//!
//! The pipeline is packaging glue around external tools, run strictly in
//! order with no retries:
//!
//! 1. Extract the version token from the build-metadata file
//! 2. Clone and build the bootloader toolchain against the deployment target
//! 3. Install the toolchain into the active build environment
//! 4. Run the packaging tool against the declarative spec file
//! 5. Inject the prebuilt entry-point binary into the bundle
//! 6. Run the post-build hook (a no-op unless replaced)
//! 7. Deep-sign the bundle with the configured identity
//!
//! The first failure halts the pipeline; the process exits with the failing
//! external tool's exit code.
//!
//! ## Usage
//!
//! ```bash
//! appbundler build --project-dir . --identity "Developer ID Application: ..."
//! appbundler validate                  # Preflight inputs and tools
//! appbundler container --uid 1000     # Write the container recipe
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(rust_2018_idioms)]

// Core modules
pub mod bundle;
pub mod cli;
pub mod container;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod settings;
pub mod sign;
pub mod toolchain;
pub mod version;

// Re-export main types for public API
pub use cli::{Args, OutputManager};
pub use error::{PipelineError, Result};
pub use pipeline::{BuildOutcome, BuildState, Pipeline, PostBuildContext, PostBuildHook, Stage};
pub use settings::{Settings, SettingsOverrides};
