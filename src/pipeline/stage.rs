//! Pipeline stages and the failure policy of each.

use std::fmt;

/// What happens when a stage fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Abort the run with the stage's error.
    Strict,
    /// Log the error and continue.
    Lenient,
}

/// A step of a pipeline run, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Build tool version floor.
    ToolVersion,
    /// Registry scope lookup.
    ScopeAccess,
    /// Workspace change status.
    Status,
    /// Version label reconciliation.
    Labels,
    /// Component build.
    Build,
    /// Local lane creation or switch.
    EnsureLane,
    /// Snap onto the lane.
    Snap,
    /// Removal of the stale remote lane.
    RemoveRemoteLane,
    /// Export to the remote scope.
    Export,
    /// Status comment upsert.
    Comment,
}

impl Stage {
    /// Stages that publish or label, skipped when nothing changed.
    pub const PUBLISHING: [Self; 6] = [
        Self::Labels,
        Self::Build,
        Self::EnsureLane,
        Self::Snap,
        Self::RemoveRemoteLane,
        Self::Export,
    ];

    /// Failure policy of the stage.
    ///
    /// Labelling and remote lane cleanup only affect auxiliary visibility, so
    /// their failures are tolerated. Everything else aborts the run.
    #[must_use]
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Self::Labels | Self::RemoveRemoteLane => FailurePolicy::Lenient,
            Self::ToolVersion
            | Self::ScopeAccess
            | Self::Status
            | Self::Build
            | Self::EnsureLane
            | Self::Snap
            | Self::Export
            | Self::Comment => FailurePolicy::Strict,
        }
    }

    /// Stable snake-case name used in logs and telemetry.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ToolVersion => "tool_version",
            Self::ScopeAccess => "scope_access",
            Self::Status => "status",
            Self::Labels => "labels",
            Self::Build => "build",
            Self::EnsureLane => "ensure_lane",
            Self::Snap => "snap",
            Self::RemoveRemoteLane => "remove_remote_lane",
            Self::Export => "export",
            Self::Comment => "comment",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
