//! Validate command implementation: preflight checks before a build.
//!
//! Reports every finding rather than stopping at the first, then fails the
//! command if any check did not pass.

use crate::cli::{Args, Command, OutputManager};
use crate::error::{CliError, PipelineError, Result};
use crate::settings::Settings;
use std::path::Path;

/// Outcome of one preflight check
struct Finding {
    name: String,
    passed: bool,
    detail: String,
}

/// Execute the validate command
pub(super) fn execute_validate(args: &Args, output: &OutputManager) -> Result<()> {
    let Command::Validate {
        project_dir,
        config,
    } = &args.command
    else {
        unreachable!("execute_validate called with non-Validate command");
    };

    let _ = output.verbose("Running preflight checks...");

    let settings = match Settings::load(project_dir, config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            output.error(&format!("Settings could not be loaded: {}", e));
            return Err(PipelineError::Cli(CliError::ValidationFailed { failures: 1 }));
        }
    };

    let mut findings = Vec::new();
    check_file(&mut findings, "metadata file", &settings.metadata_path());
    check_file(&mut findings, "spec file", &settings.spec_path());
    check_file(&mut findings, "entry-point binary", &settings.entry_point_path());

    findings.push(Finding {
        name: "signing identity".to_string(),
        passed: !settings.signing.identity.trim().is_empty(),
        detail: if settings.signing.identity.trim().is_empty() {
            "identity is empty".to_string()
        } else {
            settings.signing.identity.clone()
        },
    });

    for tool in [
        &settings.tools.git,
        &settings.tools.python,
        &settings.tools.pip,
        &settings.tools.packager,
        &settings.tools.signer,
    ] {
        check_tool(&mut findings, tool);
    }

    let failures = findings.iter().filter(|f| !f.passed).count();

    for finding in &findings {
        let line = format!("{}: {}", finding.name, finding.detail);
        if finding.passed {
            let _ = output.success(&line);
        } else {
            output.error(&line);
        }
    }

    if failures > 0 {
        return Err(PipelineError::Cli(CliError::ValidationFailed { failures }));
    }

    Ok(())
}

fn check_file(findings: &mut Vec<Finding>, name: &str, path: &Path) {
    findings.push(Finding {
        name: name.to_string(),
        passed: path.is_file(),
        detail: if path.is_file() {
            path.display().to_string()
        } else {
            format!("not found at {}", path.display())
        },
    });
}

fn check_tool(findings: &mut Vec<Finding>, tool: &str) {
    let finding = match which::which(tool) {
        Ok(resolved) => Finding {
            name: format!("tool '{}'", tool),
            passed: true,
            detail: resolved.display().to_string(),
        },
        Err(e) => Finding {
            name: format!("tool '{}'", tool),
            passed: false,
            detail: e.to_string(),
        },
    };
    findings.push(finding);
}
