//! Layered configuration for the build pipeline.
//!
//! Settings come from three layers, later layers winning: serde defaults, an
//! optional TOML file (`appbundler.toml` in the project directory by default),
//! and CLI flag overrides.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default settings file name looked up in the project directory
pub const SETTINGS_FILE_NAME: &str = "appbundler.toml";

/// Complete pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Project inputs and outputs
    pub project: ProjectSettings,
    /// Bootloader toolchain acquisition
    pub toolchain: ToolchainSettings,
    /// Code signing configuration
    pub signing: SigningSettings,
    /// External tool program names
    pub tools: ToolSettings,

    /// Directory all relative paths resolve against.
    ///
    /// Set from the CLI, never from the settings file.
    #[serde(skip)]
    pub project_dir: PathBuf,
}

/// Project inputs and outputs
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectSettings {
    /// Text file containing the numeric version token
    pub metadata_file: PathBuf,
    /// Declarative spec file consumed by the packaging tool
    pub spec_file: PathBuf,
    /// Prebuilt entry-point binary copied into the bundle
    pub entry_point: PathBuf,
    /// Name of the produced bundle directory
    pub bundle_name: String,
    /// Directory the packaging tool writes the bundle into
    pub dist_dir: PathBuf,
}

impl Default for ProjectSettings {
    fn default() -> Self {
        Self {
            metadata_file: PathBuf::from("VERSION"),
            spec_file: PathBuf::from("app.spec"),
            entry_point: PathBuf::from("app-cli"),
            bundle_name: "App.app".to_string(),
            dist_dir: PathBuf::from("dist"),
        }
    }
}

/// Bootloader toolchain acquisition settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Repository the toolchain is cloned from
    pub repo_url: String,
    /// Branch to check out
    pub branch: String,
    /// Minimum OS version the bootloader is built against
    pub deployment_target: String,
    /// Directory the toolchain is cloned into, relative to the project
    pub checkout_dir: PathBuf,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            repo_url: "https://github.com/pyinstaller/pyinstaller.git".to_string(),
            branch: "develop".to_string(),
            deployment_target: "10.13".to_string(),
            checkout_dir: PathBuf::from("build/pyinstaller"),
        }
    }
}

/// Code signing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    /// Certificate name passed to the signer.
    ///
    /// The default `-` is the signer's ad-hoc identity.
    pub identity: String,
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            identity: "-".to_string(),
        }
    }
}

/// Program names for the external tools each stage shells out to.
///
/// Overridable so tests can substitute stub executables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    /// Source-control fetch tool
    pub git: String,
    /// Interpreter that drives the bootloader build
    pub python: String,
    /// Package installer for the built toolchain
    pub pip: String,
    /// Packaging tool that produces the bundle
    pub packager: String,
    /// Code-signing tool
    pub signer: String,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            git: "git".to_string(),
            python: "python3".to_string(),
            pip: "pip3".to_string(),
            packager: "pyinstaller".to_string(),
            signer: "codesign".to_string(),
        }
    }
}

/// CLI flag overrides applied on top of the settings file
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// Override for `project.metadata_file`
    pub metadata_file: Option<PathBuf>,
    /// Override for `project.spec_file`
    pub spec_file: Option<PathBuf>,
    /// Override for `project.entry_point`
    pub entry_point: Option<PathBuf>,
    /// Override for `signing.identity`
    pub identity: Option<String>,
    /// Override for `toolchain.deployment_target`
    pub deployment_target: Option<String>,
}

impl Settings {
    /// Load settings for a project directory.
    ///
    /// Reads `config_path` if given, otherwise `appbundler.toml` inside the
    /// project directory if it exists, otherwise pure defaults. An explicitly
    /// named config file that is missing is an error; the implicit one is not.
    pub fn load(project_dir: &Path, config_path: Option<&Path>) -> Result<Self> {
        let mut settings = match config_path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                toml::from_str::<Settings>(&content)?
            }
            None => {
                let implicit = project_dir.join(SETTINGS_FILE_NAME);
                if implicit.exists() {
                    let content = std::fs::read_to_string(&implicit)?;
                    toml::from_str::<Settings>(&content)?
                } else {
                    Settings::default()
                }
            }
        };
        settings.project_dir = project_dir.to_path_buf();
        Ok(settings)
    }

    /// Apply CLI flag overrides on top of loaded settings
    pub fn apply_overrides(&mut self, overrides: &SettingsOverrides) {
        if let Some(path) = &overrides.metadata_file {
            self.project.metadata_file = path.clone();
        }
        if let Some(path) = &overrides.spec_file {
            self.project.spec_file = path.clone();
        }
        if let Some(path) = &overrides.entry_point {
            self.project.entry_point = path.clone();
        }
        if let Some(identity) = &overrides.identity {
            self.signing.identity = identity.clone();
        }
        if let Some(target) = &overrides.deployment_target {
            self.toolchain.deployment_target = target.clone();
        }
    }

    /// Absolute path to the build-metadata file
    pub fn metadata_path(&self) -> PathBuf {
        self.project_dir.join(&self.project.metadata_file)
    }

    /// Absolute path to the packaging spec file
    pub fn spec_path(&self) -> PathBuf {
        self.project_dir.join(&self.project.spec_file)
    }

    /// Absolute path to the prebuilt entry-point binary
    pub fn entry_point_path(&self) -> PathBuf {
        self.project_dir.join(&self.project.entry_point)
    }

    /// Absolute path the finished bundle lands at
    pub fn bundle_path(&self) -> PathBuf {
        self.project_dir
            .join(&self.project.dist_dir)
            .join(&self.project.bundle_name)
    }

    /// Absolute path of the toolchain checkout
    pub fn checkout_path(&self) -> PathBuf {
        self.project_dir.join(&self.toolchain.checkout_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_are_sensible() {
        let settings = Settings::default();
        assert_eq!(settings.project.dist_dir, PathBuf::from("dist"));
        assert_eq!(settings.toolchain.branch, "develop");
        assert_eq!(settings.signing.identity, "-");
        assert_eq!(settings.tools.signer, "codesign");
    }

    #[test]
    fn load_without_file_uses_defaults() {
        let temp = TempDir::new().expect("temp dir");
        let settings = Settings::load(temp.path(), None).expect("load");
        assert_eq!(settings.project_dir, temp.path());
        assert_eq!(settings.project.bundle_name, "App.app");
    }

    #[test]
    fn load_reads_implicit_settings_file() {
        let temp = TempDir::new().expect("temp dir");
        std::fs::write(
            temp.path().join(SETTINGS_FILE_NAME),
            r#"
[project]
bundle_name = "Maestral.app"
metadata_file = "maestral/__init__.py"

[signing]
identity = "Developer ID Application: Example Corp"
"#,
        )
        .expect("write settings");

        let settings = Settings::load(temp.path(), None).expect("load");
        assert_eq!(settings.project.bundle_name, "Maestral.app");
        assert_eq!(
            settings.signing.identity,
            "Developer ID Application: Example Corp"
        );
        // Unset sections keep their defaults
        assert_eq!(settings.toolchain.branch, "develop");
    }

    #[test]
    fn overrides_win_over_file_values() {
        let temp = TempDir::new().expect("temp dir");
        let mut settings = Settings::load(temp.path(), None).expect("load");
        settings.apply_overrides(&SettingsOverrides {
            identity: Some("Test Identity".to_string()),
            deployment_target: Some("11.0".to_string()),
            ..Default::default()
        });
        assert_eq!(settings.signing.identity, "Test Identity");
        assert_eq!(settings.toolchain.deployment_target, "11.0");
        assert_eq!(settings.project.spec_file, PathBuf::from("app.spec"));
    }

    #[test]
    fn paths_resolve_against_project_dir() {
        let temp = TempDir::new().expect("temp dir");
        let settings = Settings::load(temp.path(), None).expect("load");
        assert_eq!(
            settings.bundle_path(),
            temp.path().join("dist").join("App.app")
        );
        assert_eq!(settings.metadata_path(), temp.path().join("VERSION"));
    }
}
