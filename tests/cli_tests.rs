//! Binary-level tests for the container and validate commands.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

#[test]
fn container_writes_recipe_with_build_args() {
    let temp = TempDir::new().expect("temp dir");

    Command::cargo_bin("appbundler")
        .expect("binary")
        .args([
            "container",
            "--target-dir",
            &temp.path().display().to_string(),
            "--uid",
            "1234",
            "--package-version",
            "1.3.0",
        ])
        .assert()
        .success();

    let content =
        std::fs::read_to_string(temp.path().join("Dockerfile")).expect("read recipe");
    assert!(content.contains("ARG UID=1234"));
    assert!(content.contains("ARG VERSION=1.3.0"));
    assert!(content.contains("VOLUME"));
}

#[test]
fn container_rejects_blank_package_version() {
    Command::cargo_bin("appbundler")
        .expect("binary")
        .args(["container", "--package-version", " "])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Invalid arguments"));
}

#[test]
fn validate_fails_for_empty_project() {
    let temp = TempDir::new().expect("temp dir");

    Command::cargo_bin("appbundler")
        .expect("binary")
        .args([
            "validate",
            "--project-dir",
            &temp.path().display().to_string(),
        ])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("metadata file"));
}

#[test]
fn quiet_and_verbose_conflict() {
    Command::cargo_bin("appbundler")
        .expect("binary")
        .args(["build", "--quiet", "--verbose"])
        .assert()
        .failure();
}
