//! Machine-readable build reports and stage timing.

use crate::error::Result;
use crate::pipeline::Stage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use walkdir::WalkDir;

/// Timing record for one completed stage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageRecord {
    /// Stage that ran
    pub stage: Stage,
    /// When the stage started
    pub started_at: DateTime<Utc>,
    /// When the stage finished
    pub finished_at: DateTime<Utc>,
}

impl StageRecord {
    /// Wall-clock time the stage took
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Report of a successful pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildReport {
    /// When the pipeline started
    pub started_at: DateTime<Utc>,
    /// When the pipeline finished
    pub finished_at: DateTime<Utc>,
    /// Version identifier extracted in stage 1
    pub version: String,
    /// Path of the signed bundle
    pub bundle_path: String,
    /// Total size of the bundle tree in bytes
    pub bundle_size_bytes: u64,
    /// Hex SHA-256 of the injected entry-point binary
    pub entry_point_sha256: String,
    /// Per-stage timing, in execution order
    pub stages: Vec<StageRecord>,
}

impl BuildReport {
    /// Write the report as pretty JSON, atomically.
    ///
    /// Writes to a sibling temp file first and renames into place so a crash
    /// mid-write never leaves a truncated report.
    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let temp_path = path.with_extension("tmp");
        std::fs::write(&temp_path, json)?;
        std::fs::rename(&temp_path, path)?;
        Ok(())
    }
}

/// Total size in bytes of all files under a directory tree
pub fn tree_size_bytes(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter_map(|entry| entry.metadata().ok())
        .map(|metadata| metadata.len())
        .sum()
}

/// Render a duration for the timing summary ("1m 23s", "4s")
pub fn format_duration(duration: chrono::Duration) -> String {
    let total_seconds = duration.num_seconds();
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    if hours > 0 {
        format!("{}h {}m {}s", hours, minutes, seconds)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_report() -> BuildReport {
        let now = Utc::now();
        BuildReport {
            started_at: now,
            finished_at: now,
            version: "42".to_string(),
            bundle_path: "dist/App.app".to_string(),
            bundle_size_bytes: 1024,
            entry_point_sha256: "ab".repeat(32),
            stages: vec![StageRecord {
                stage: Stage::VersionExtraction,
                started_at: now,
                finished_at: now,
            }],
        }
    }

    #[test]
    fn report_round_trips_through_json() {
        let report = sample_report();
        let json = serde_json::to_string(&report).expect("serialize");
        let back: BuildReport = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back.version, "42");
        assert_eq!(back.stages.len(), 1);
    }

    #[test]
    fn write_leaves_no_temp_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("report.json");
        sample_report().write(&path).expect("write report");

        assert!(path.is_file());
        assert!(!temp.path().join("report.tmp").exists());

        let content = std::fs::read_to_string(&path).expect("read report");
        assert!(content.contains("\"version\": \"42\""));
    }

    #[test]
    fn tree_size_sums_files() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::create_dir_all(temp.path().join("a/b")).expect("dirs");
        std::fs::write(temp.path().join("a/x"), b"12345").expect("write");
        std::fs::write(temp.path().join("a/b/y"), b"123").expect("write");
        assert_eq!(tree_size_bytes(temp.path()), 8);
    }

    #[test]
    fn durations_render_compactly() {
        assert_eq!(format_duration(chrono::Duration::seconds(4)), "4s");
        assert_eq!(format_duration(chrono::Duration::seconds(83)), "1m 23s");
        assert_eq!(format_duration(chrono::Duration::seconds(3723)), "1h 2m 3s");
    }
}
