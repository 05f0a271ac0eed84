//! Build command implementation: run the full pipeline.

use crate::cli::{Args, Command, OutputManager};
use crate::error::Result;
use crate::pipeline::{format_duration, Pipeline};
use crate::settings::{Settings, SettingsOverrides};

/// Execute the build command.
///
/// Returns the process exit code. Pipeline failures are returned as errors so
/// the dispatcher can propagate the failing tool's exit code.
pub(super) async fn execute_build(args: &Args, output: &OutputManager) -> Result<i32> {
    let Command::Build {
        project_dir,
        config,
        spec_file,
        metadata_file,
        entry_point,
        identity,
        deployment_target,
        report,
    } = &args.command
    else {
        unreachable!("execute_build called with non-Build command");
    };

    let mut settings = Settings::load(project_dir, config.as_deref())?;
    settings.apply_overrides(&SettingsOverrides {
        metadata_file: metadata_file.clone(),
        spec_file: spec_file.clone(),
        entry_point: entry_point.clone(),
        identity: identity.clone(),
        deployment_target: deployment_target.clone(),
    });

    let pipeline = Pipeline::new(settings, output.clone());
    let outcome = pipeline.run().await?;

    if let Some(report_path) = report {
        outcome.report.write(report_path)?;
        let _ = output.verbose(&format!("Report written to {}", report_path.display()));
    }

    let _ = output.section("Summary");
    for record in &outcome.report.stages {
        let _ = output.println(&format!(
            "  {:<22} {}",
            record.stage.to_string(),
            format_duration(record.duration())
        ));
    }
    let _ = output.success(&format!(
        "Signed bundle v{} at {}",
        outcome.version,
        outcome.bundle_path.display()
    ));

    Ok(0)
}
