//! Pipeline stage identities and the build state machine.

use serde::{Deserialize, Serialize};

/// A single stage of the build pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    /// Extract the numeric version token from the build metadata file
    VersionExtraction,
    /// Clone and build the bootloader toolchain
    ToolchainBuild,
    /// Install the built toolchain into the local environment
    ToolchainInstall,
    /// Run the packaging tool against the spec file
    Packaging,
    /// Copy the prebuilt entry-point binary into the bundle
    EntryPointInjection,
    /// User-overridable hook between injection and signing
    PostBuild,
    /// Deep-sign the finished bundle
    Signing,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 7] = [
        Stage::VersionExtraction,
        Stage::ToolchainBuild,
        Stage::ToolchainInstall,
        Stage::Packaging,
        Stage::EntryPointInjection,
        Stage::PostBuild,
        Stage::Signing,
    ];

    /// The state the pipeline enters once this stage completes.
    pub fn completed_state(self) -> BuildState {
        match self {
            Stage::VersionExtraction => BuildState::VersionExtracted,
            Stage::ToolchainBuild => BuildState::ToolchainBuilt,
            Stage::ToolchainInstall => BuildState::ToolchainInstalled,
            Stage::Packaging => BuildState::Packaged,
            Stage::EntryPointInjection => BuildState::EntryPointInjected,
            Stage::PostBuild => BuildState::PostBuildDone,
            Stage::Signing => BuildState::Signed,
        }
    }

    /// One-based position of this stage in the pipeline.
    pub fn number(self) -> usize {
        match Stage::ALL.iter().position(|s| *s == self) {
            Some(idx) => idx + 1,
            None => 0,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::VersionExtraction => write!(f, "Version extraction"),
            Stage::ToolchainBuild => write!(f, "Toolchain build"),
            Stage::ToolchainInstall => write!(f, "Toolchain install"),
            Stage::Packaging => write!(f, "Packaging"),
            Stage::EntryPointInjection => write!(f, "Entry-point injection"),
            Stage::PostBuild => write!(f, "Post-build hook"),
            Stage::Signing => write!(f, "Signing"),
        }
    }
}

/// State of a build as it moves through the pipeline.
///
/// Transitions are strictly linear: each completed stage advances the state by
/// one step, any failure moves it to `Failed`. `Signed` and `Failed` are
/// terminal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BuildState {
    /// No stage has run yet
    Start,
    /// Version token extracted from the metadata file
    VersionExtracted,
    /// Bootloader toolchain cloned and built
    ToolchainBuilt,
    /// Toolchain installed into the build environment
    ToolchainInstalled,
    /// Application bundle produced by the packaging tool
    Packaged,
    /// Entry-point binary copied into the bundle
    EntryPointInjected,
    /// Post-build hook ran to completion
    PostBuildDone,
    /// Bundle deep-signed; the pipeline is complete
    Signed,
    /// A stage failed and the pipeline stopped
    Failed {
        /// Stage that failed
        stage: Stage,
        /// Rendered cause of the failure
        message: String,
    },
}

impl BuildState {
    /// Whether this state ends the pipeline.
    pub fn is_terminal(&self) -> bool {
        matches!(self, BuildState::Signed | BuildState::Failed { .. })
    }
}

impl std::fmt::Display for BuildState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BuildState::Start => write!(f, "Start"),
            BuildState::VersionExtracted => write!(f, "VersionExtracted"),
            BuildState::ToolchainBuilt => write!(f, "ToolchainBuilt"),
            BuildState::ToolchainInstalled => write!(f, "ToolchainInstalled"),
            BuildState::Packaged => write!(f, "Packaged"),
            BuildState::EntryPointInjected => write!(f, "EntryPointInjected"),
            BuildState::PostBuildDone => write!(f, "PostBuildDone"),
            BuildState::Signed => write!(f, "Signed"),
            BuildState::Failed { stage, .. } => write!(f, "Failed({stage})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_are_ordered() {
        let mut prev = None;
        for stage in Stage::ALL {
            if let Some(p) = prev {
                assert!(p < stage, "{p} should order before {stage}");
            }
            prev = Some(stage);
        }
    }

    #[test]
    fn stage_numbers_are_one_based() {
        assert_eq!(Stage::VersionExtraction.number(), 1);
        assert_eq!(Stage::Signing.number(), 7);
    }

    #[test]
    fn completed_states_follow_the_machine() {
        assert_eq!(
            Stage::VersionExtraction.completed_state(),
            BuildState::VersionExtracted
        );
        assert_eq!(Stage::Packaging.completed_state(), BuildState::Packaged);
        assert_eq!(Stage::Signing.completed_state(), BuildState::Signed);
    }

    #[test]
    fn only_signed_and_failed_are_terminal() {
        assert!(BuildState::Signed.is_terminal());
        assert!(
            BuildState::Failed {
                stage: Stage::Packaging,
                message: "exit code 1".to_string(),
            }
            .is_terminal()
        );
        assert!(!BuildState::Start.is_terminal());
        assert!(!BuildState::Packaged.is_terminal());
    }

    #[test]
    fn state_serializes_by_name() {
        let json = serde_json::to_string(&BuildState::Signed).expect("serialize");
        assert_eq!(json, "\"Signed\"");
    }
}
