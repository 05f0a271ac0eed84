//! The sequential build pipeline.
//!
//! Seven stages, strictly in order, no retries: version extraction, toolchain
//! build, toolchain install, packaging, entry-point injection, the post-build
//! hook, and signing. The first failure halts the pipeline and surfaces as a
//! [`PipelineError`](crate::error::PipelineError) carrying the failing
//! stage's identity and the external tool's exit code.

mod hook;
mod report;
mod stage;

pub use hook::{NoopHook, PostBuildContext, PostBuildHook};
pub use report::{format_duration, tree_size_bytes, BuildReport, StageRecord};
pub use stage::{BuildState, Stage};

use crate::cli::OutputManager;
use crate::error::Result;
use crate::settings::Settings;
use crate::{bundle, sign, toolchain, version};
use chrono::{DateTime, Utc};
use std::path::PathBuf;

/// Result of a successful pipeline run
#[derive(Debug)]
pub struct BuildOutcome {
    /// Version identifier extracted in stage 1
    pub version: String,
    /// Path of the signed bundle
    pub bundle_path: PathBuf,
    /// Terminal state, always `Signed` on success
    pub state: BuildState,
    /// Machine-readable report of the run
    pub report: BuildReport,
}

/// Orchestrator for the seven-stage build.
///
/// Owns the settings, the output manager stage banners go through, and the
/// post-build hook. The hook defaults to [`NoopHook`] and is swappable via
/// [`Pipeline::with_hook`] without touching the stage sequence.
pub struct Pipeline {
    settings: Settings,
    output: OutputManager,
    hook: Box<dyn PostBuildHook>,
}

impl Pipeline {
    /// Create a pipeline with the default no-op post-build hook
    pub fn new(settings: Settings, output: OutputManager) -> Self {
        Self {
            settings,
            output,
            hook: Box::new(NoopHook),
        }
    }

    /// Replace the post-build hook
    pub fn with_hook(mut self, hook: Box<dyn PostBuildHook>) -> Self {
        self.hook = hook;
        self
    }

    /// Run all seven stages in order, halting at the first failure.
    ///
    /// On failure the failing stage's banner is the last line on stdout; the
    /// error itself goes to stderr at the CLI boundary.
    pub async fn run(&self) -> Result<BuildOutcome> {
        let started_at = Utc::now();
        let mut records: Vec<StageRecord> = Vec::with_capacity(Stage::ALL.len());

        // Stage 1: version extraction
        let stage_start = self.banner(Stage::VersionExtraction)?;
        let version = version::extract_version(&self.settings.metadata_path())?;
        let _ = self.output.info(&format!("Building version {version}"));
        finish(&mut records, Stage::VersionExtraction, stage_start);

        // The toolchain environment is computed once and never changes
        // mid-pipeline.
        let env = toolchain::deployment_env(&self.settings.toolchain.deployment_target);

        // Stage 2: toolchain clone and bootloader build
        let stage_start = self.banner(Stage::ToolchainBuild)?;
        let checkout = toolchain::fetch_and_build(&self.settings, &env, &self.output).await?;
        finish(&mut records, Stage::ToolchainBuild, stage_start);

        // Stage 3: toolchain install
        let stage_start = self.banner(Stage::ToolchainInstall)?;
        toolchain::install(&checkout, &self.settings, &self.output).await?;
        finish(&mut records, Stage::ToolchainInstall, stage_start);

        // Stage 4: packaging
        let stage_start = self.banner(Stage::Packaging)?;
        let bundle_path = bundle::package(&self.settings, &self.output).await?;
        finish(&mut records, Stage::Packaging, stage_start);

        // Stage 5: entry-point injection
        let stage_start = self.banner(Stage::EntryPointInjection)?;
        let entry_point_sha256 =
            bundle::inject_entry_point(&bundle_path, &self.settings.entry_point_path())?;
        finish(&mut records, Stage::EntryPointInjection, stage_start);

        // Stage 6: post-build hook, still unsigned
        let stage_start = self.banner(Stage::PostBuild)?;
        self.hook.run(&PostBuildContext {
            version: &version,
            bundle_path: &bundle_path,
        })?;
        finish(&mut records, Stage::PostBuild, stage_start);

        // Stage 7: signing, always last
        let stage_start = self.banner(Stage::Signing)?;
        sign::sign_bundle(&bundle_path, &self.settings, &self.output).await?;
        finish(&mut records, Stage::Signing, stage_start);

        let report = BuildReport {
            started_at,
            finished_at: Utc::now(),
            version: version.clone(),
            bundle_path: bundle_path.display().to_string(),
            bundle_size_bytes: tree_size_bytes(&bundle_path),
            entry_point_sha256,
            stages: records,
        };

        Ok(BuildOutcome {
            version,
            bundle_path,
            state: BuildState::Signed,
            report,
        })
    }

    /// Emit a stage banner and return the stage start time
    fn banner(&self, stage: Stage) -> Result<DateTime<Utc>> {
        self.output.section(&format!(
            "[{}/{}] {}",
            stage.number(),
            Stage::ALL.len(),
            stage
        ))?;
        Ok(Utc::now())
    }
}

fn finish(records: &mut Vec<StageRecord>, stage: Stage, started_at: DateTime<Utc>) {
    records.push(StageRecord {
        stage,
        started_at,
        finished_at: Utc::now(),
    });
}
