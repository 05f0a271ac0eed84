//! End-to-end pipeline tests against stub external tools.
//!
//! Each external tool is replaced by an executable shell script that records
//! its invocation to a shared log, so stage ordering and fail-fast behavior
//! are observable without any real toolchain on the machine.

#![cfg(unix)]

use appbundler::error::PipelineError;
use appbundler::pipeline::{PostBuildContext, PostBuildHook};
use appbundler::settings::{
    ProjectSettings, Settings, SigningSettings, ToolSettings, ToolchainSettings,
};
use appbundler::{BuildState, OutputManager, Pipeline};
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Write an executable stub script and return its absolute path
fn write_stub(bin_dir: &Path, name: &str, body: &str) -> String {
    let path = bin_dir.join(name);
    fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("write stub");
    fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).expect("chmod stub");
    path.display().to_string()
}

/// A hermetic project with stubbed tools and an invocation log
struct StubProject {
    dir: TempDir,
    settings: Settings,
    log_path: PathBuf,
}

impl StubProject {
    /// Set up a project where every stage tool succeeds.
    ///
    /// The git stub creates the checkout (including the bootloader
    /// directory), the packager stub fails with exit 3 unless the spec file
    /// exists and otherwise creates the bundle skeleton, and the signer stub
    /// exits with `sign_exit`.
    fn new(sign_exit: i32) -> Self {
        let dir = TempDir::new().expect("temp dir");
        let bin_dir = dir.path().join("bin");
        fs::create_dir_all(&bin_dir).expect("bin dir");

        let log_path = dir.path().join("invocations.log");
        let log = log_path.display();

        let git = write_stub(
            &bin_dir,
            "git",
            &format!(
                "echo git >> {log}\nfor a; do last=$a; done\nmkdir -p \"$last/bootloader\""
            ),
        );
        let python = write_stub(&bin_dir, "python3", &format!("echo python >> {log}"));
        let pip = write_stub(&bin_dir, "pip3", &format!("echo pip >> {log}"));
        let packager = write_stub(
            &bin_dir,
            "packager",
            &format!(
                "echo packager >> {log}\n\
                 for a; do last=$a; done\n\
                 [ -f \"$last\" ] || exit 3\n\
                 mkdir -p dist/App.app/Contents/MacOS"
            ),
        );
        let signer = write_stub(
            &bin_dir,
            "signer",
            &format!("echo signer >> {log}\nexit {sign_exit}"),
        );

        let settings = Settings {
            project: ProjectSettings::default(),
            toolchain: ToolchainSettings {
                repo_url: "https://example.invalid/toolchain.git".to_string(),
                branch: "develop".to_string(),
                deployment_target: "10.13".to_string(),
                checkout_dir: PathBuf::from("build/toolchain"),
            },
            signing: SigningSettings {
                identity: "Test Identity".to_string(),
            },
            tools: ToolSettings {
                git,
                python,
                pip,
                packager,
                signer,
            },
            project_dir: dir.path().to_path_buf(),
        };

        Self {
            dir,
            settings,
            log_path,
        }
    }

    fn write_metadata(&self, content: &str) {
        fs::write(self.dir.path().join("VERSION"), content).expect("write metadata");
    }

    fn write_spec(&self) {
        fs::write(self.dir.path().join("app.spec"), "# packaging spec\n").expect("write spec");
    }

    fn write_entry_point(&self) {
        fs::write(self.dir.path().join("app-cli"), b"#!/bin/sh\nexit 0\n")
            .expect("write entry point");
    }

    fn invocations(&self) -> Vec<String> {
        match fs::read_to_string(&self.log_path) {
            Ok(content) => content.lines().map(str::to_string).collect(),
            Err(_) => Vec::new(),
        }
    }

    fn pipeline(&self) -> Pipeline {
        Pipeline::new(self.settings.clone(), OutputManager::new(false, true))
    }
}

#[tokio::test]
async fn full_pipeline_ends_signed() {
    let project = StubProject::new(0);
    project.write_metadata("Build 42\n");
    project.write_spec();
    project.write_entry_point();

    let outcome = project.pipeline().run().await.expect("pipeline succeeds");

    assert_eq!(outcome.version, "42");
    assert_eq!(outcome.state, BuildState::Signed);
    assert!(outcome.bundle_path.is_dir());

    // Every stage tool ran, in order, with signing last
    assert_eq!(
        project.invocations(),
        vec!["git", "python", "pip", "packager", "signer"]
    );

    // The entry point was injected and made executable
    let injected = outcome.bundle_path.join("Contents/MacOS/app-cli");
    assert!(injected.is_file());
    let mode = fs::metadata(&injected)
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o755);

    // The report covers all seven stages
    assert_eq!(outcome.report.stages.len(), 7);
    assert_eq!(outcome.report.version, "42");
    assert_eq!(outcome.report.entry_point_sha256.len(), 64);
    assert!(outcome.report.bundle_size_bytes > 0);
}

#[tokio::test]
async fn missing_spec_fails_packaging_with_tool_exit_code() {
    let project = StubProject::new(0);
    project.write_metadata("Build 42\n");
    project.write_entry_point();
    // No spec file: the packager stub exits 3

    let err = project.pipeline().run().await.expect_err("packaging fails");

    assert!(matches!(err, PipelineError::Packaging(_)));
    assert_eq!(err.exit_code(), 3);

    // No bundle was created and signing never ran
    assert!(!project.dir.path().join("dist").exists());
    assert!(!project.invocations().contains(&"signer".to_string()));
}

#[tokio::test]
async fn missing_entry_point_leaves_bundle_unsigned() {
    let project = StubProject::new(0);
    project.write_metadata("Build 42\n");
    project.write_spec();
    // No entry-point binary

    let err = project.pipeline().run().await.expect_err("injection fails");

    assert!(matches!(err, PipelineError::Copy(_)));

    // The bundle is left in its post-packaging state: present, no injected
    // entry point, never signed
    let bundle = project.dir.path().join("dist/App.app");
    assert!(bundle.is_dir());
    assert!(!bundle.join("Contents/MacOS/app-cli").exists());
    assert!(!project.invocations().contains(&"signer".to_string()));
}

#[tokio::test]
async fn failed_signing_propagates_signer_exit_code() {
    let project = StubProject::new(5);
    project.write_metadata("Build 42\n");
    project.write_spec();
    project.write_entry_point();

    let err = project.pipeline().run().await.expect_err("signing fails");

    assert!(matches!(err, PipelineError::Signing(_)));
    assert_eq!(err.exit_code(), 5);
}

#[tokio::test]
async fn metadata_without_digits_halts_before_any_tool() {
    let project = StubProject::new(0);
    project.write_metadata("no version token here\n");
    project.write_spec();
    project.write_entry_point();

    let err = project.pipeline().run().await.expect_err("extraction fails");

    assert!(matches!(err, PipelineError::Parse(_)));
    assert_eq!(err.exit_code(), 1);
    assert!(project.invocations().is_empty());
}

/// Hook that appends a marker to the invocation log
struct LoggingHook {
    log_path: PathBuf,
}

impl PostBuildHook for LoggingHook {
    fn run(&self, ctx: &PostBuildContext<'_>) -> appbundler::Result<()> {
        assert!(ctx.bundle_path.is_dir(), "hook sees the unsigned bundle");
        let mut content = fs::read_to_string(&self.log_path).unwrap_or_default();
        content.push_str(&format!("hook v{}\n", ctx.version));
        fs::write(&self.log_path, content)?;
        Ok(())
    }
}

#[tokio::test]
async fn post_build_hook_runs_after_injection_and_before_signing() {
    let project = StubProject::new(0);
    project.write_metadata("Build 42\n");
    project.write_spec();
    project.write_entry_point();

    let pipeline = project.pipeline().with_hook(Box::new(LoggingHook {
        log_path: project.log_path.clone(),
    }));
    pipeline.run().await.expect("pipeline succeeds");

    assert_eq!(
        project.invocations(),
        vec!["git", "python", "pip", "packager", "hook v42", "signer"]
    );
}
