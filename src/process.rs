//! Shared subprocess plumbing for pipeline stages.
//!
//! Every stage shells out to an external tool. This module runs a configured
//! command, streams its stdout through the output manager, captures stderr,
//! and maps a non-zero exit into a [`ToolFailure`] the stage wraps into its
//! own error variant.

use crate::cli::OutputManager;
use std::process::Stdio;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;

/// Number of captured stderr lines kept in a failure detail
const STDERR_TAIL_LINES: usize = 20;

/// A failed external tool invocation
#[derive(Debug)]
pub struct ToolFailure {
    /// Human-readable label for the invocation, e.g. "git clone"
    pub label: String,
    /// Exit code, if the tool ran to completion
    pub code: Option<i32>,
    /// Captured stderr tail, or the launch failure message
    pub detail: String,
}

impl std::fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.code {
            Some(code) => write!(f, "{} exited with code {}: {}", self.label, code, self.detail),
            None => write!(f, "{} could not be run: {}", self.label, self.detail),
        }
    }
}

/// Run a configured command to completion, streaming its stdout.
///
/// stdout is echoed line by line through the output manager (indented, so tool
/// output reads as a sub-item of the stage banner). stderr is captured and its
/// tail is attached to the failure if the tool exits non-zero.
///
/// The caller sets program, arguments, working directory, and environment on
/// the `Command`; this function owns only stdio and status handling.
pub async fn run_streaming(
    mut cmd: Command,
    label: &str,
    output: &OutputManager,
) -> std::result::Result<(), ToolFailure> {
    log::debug!("Running {label}: {cmd:?}");

    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| ToolFailure {
            label: label.to_string(),
            code: None,
            detail: e.to_string(),
        })?;

    // Drain both pipes concurrently so neither side can fill and stall the
    // child.
    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let stdout_task = async {
        if let Some(stdout) = stdout {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                let _ = output.indent(&line);
            }
        }
    };

    let stderr_task = async {
        let mut captured = Vec::new();
        if let Some(stderr) = stderr {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                log::debug!("{label} stderr: {line}");
                captured.push(line);
            }
        }
        captured
    };

    let ((), stderr_lines) = tokio::join!(stdout_task, stderr_task);

    let status = child.wait().await.map_err(|e| ToolFailure {
        label: label.to_string(),
        code: None,
        detail: e.to_string(),
    })?;

    if status.success() {
        return Ok(());
    }

    let tail_start = stderr_lines.len().saturating_sub(STDERR_TAIL_LINES);
    let detail = if stderr_lines.is_empty() {
        "no stderr output".to_string()
    } else {
        stderr_lines[tail_start..].join("\n")
    };

    Err(ToolFailure {
        label: label.to_string(),
        code: status.code(),
        detail,
    })
}
