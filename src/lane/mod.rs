//! Lane lifecycle: create, snap, clear the stale remote copy, export.
//!
//! A run moves through `Idle -> LaneEnsured -> Snapped -> RemoteCleaned ->
//! Exported -> Done`. The remote copy of a same-named lane is removed only
//! after the new snap exists locally and before export, so an earlier
//! iteration of the pull request never shadows the new content.

mod message;
mod name;

pub use message::{FALLBACK_SNAP_MESSAGE, SnapMessage};
pub use name::{DEFAULT_LANE_BRANCH_PATTERN, LaneName};

use thiserror::Error;

use crate::error::PipelineError;
use crate::scope::ScopeRef;
use crate::tool::{BuildTool, ToolError, ToolInvocation};

/// Position of a run in the lane lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneState {
    /// Nothing has happened yet.
    Idle,
    /// The local lane exists and is checked out.
    LaneEnsured,
    /// Workspace changes are snapped onto the lane.
    Snapped,
    /// Remote removal was attempted, successfully or not.
    RemoteCleaned,
    /// The lane was exported to the remote scope.
    Exported,
    /// The lifecycle completed.
    Done,
}

/// A lane lifecycle step, used to label failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneStep {
    /// Creating or switching to the local lane.
    Create,
    /// Snapping workspace changes.
    Snap,
    /// Removing the stale remote lane.
    RemoveRemote,
    /// Exporting to the remote scope.
    Export,
    /// Closing the lifecycle.
    Finish,
}

impl std::fmt::Display for LaneStep {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(match self {
            Self::Create => "create",
            Self::Snap => "snap",
            Self::RemoveRemote => "remote removal",
            Self::Export => "export",
            Self::Finish => "finish",
        })
    }
}

/// Failures of a lane lifecycle step.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LaneError {
    /// A step was attempted from the wrong state.
    #[error("cannot {step} while lane is {state:?}")]
    OutOfOrder {
        /// Attempted step.
        step: LaneStep,
        /// State at the time of the attempt.
        state: LaneState,
    },

    /// The build tool failed during a step.
    #[error("{source}")]
    Tool {
        /// Failing step.
        step: LaneStep,
        /// Tool failure.
        source: ToolError,
    },
}

impl LaneError {
    /// Step during which the failure happened.
    #[must_use]
    pub const fn step(&self) -> LaneStep {
        match self {
            Self::OutOfOrder { step, .. } | Self::Tool { step, .. } => *step,
        }
    }
}

impl From<LaneError> for PipelineError {
    fn from(error: LaneError) -> Self {
        Self::LaneOperation {
            step: error.step(),
            message: error.to_string(),
        }
    }
}

/// Drives one lane through its lifecycle with the build tool.
pub struct LaneLifecycle<'tool, Tool>
where
    Tool: BuildTool + ?Sized,
{
    tool: &'tool Tool,
    scope: ScopeRef,
    name: LaneName,
    state: LaneState,
}

impl<'tool, Tool> LaneLifecycle<'tool, Tool>
where
    Tool: BuildTool + ?Sized,
{
    /// Starts an idle lifecycle for lane `name` in `scope`.
    #[must_use]
    pub const fn new(tool: &'tool Tool, scope: ScopeRef, name: LaneName) -> Self {
        Self {
            tool,
            scope,
            name,
            state: LaneState::Idle,
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub const fn state(&self) -> LaneState {
        self.state
    }

    /// Lane being published.
    #[must_use]
    pub const fn name(&self) -> &LaneName {
        &self.name
    }

    fn require(&self, step: LaneStep, allowed: &[LaneState]) -> Result<(), LaneError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(LaneError::OutOfOrder {
                step,
                state: self.state,
            })
        }
    }

    async fn run(&self, step: LaneStep, invocation: ToolInvocation) -> Result<(), LaneError> {
        self.tool
            .run(&invocation)
            .await
            .map(|_| ())
            .map_err(|source| LaneError::Tool { step, source })
    }

    /// Creates the local lane, or switches to it when it already exists.
    ///
    /// Calling this again on an ensured lane is a no-op success.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::Tool`] when neither creating nor switching to
    /// the lane succeeds.
    pub async fn ensure_lane(&mut self) -> Result<(), LaneError> {
        self.require(LaneStep::Create, &[LaneState::Idle, LaneState::LaneEnsured])?;

        let lane = self.name.as_str();
        let created = self
            .run(LaneStep::Create, ToolInvocation::new(["lane", "create", lane]))
            .await;

        if let Err(create_error) = created {
            tracing::debug!(lane, "lane create failed, switching instead: {create_error}");
            self.run(LaneStep::Create, ToolInvocation::new(["lane", "switch", lane]))
                .await
                .map_err(|_| create_error)?;
        }

        tracing::info!(lane, "lane ensured");
        self.state = LaneState::LaneEnsured;
        Ok(())
    }

    /// Snaps the workspace onto the lane with `message`.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError`] when the lane is not ensured or the snap fails.
    pub async fn snap(&mut self, message: &SnapMessage) -> Result<(), LaneError> {
        self.require(LaneStep::Snap, &[LaneState::LaneEnsured])?;
        self.run(
            LaneStep::Snap,
            ToolInvocation::new(["snap", "--message", message.as_str()]),
        )
        .await?;

        tracing::info!(lane = self.name.as_str(), "workspace snapped");
        self.state = LaneState::Snapped;
        Ok(())
    }

    /// Removes the remote lane of the same name, once.
    ///
    /// The lifecycle advances whether or not removal succeeds: the remote
    /// lane legitimately may not exist. The caller decides whether the
    /// returned error matters.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError`] when called out of order or when the tool
    /// reports a failure, for example because the remote lane is absent.
    pub async fn remove_remote_lane(&mut self) -> Result<(), LaneError> {
        self.require(LaneStep::RemoveRemote, &[LaneState::Snapped])?;
        let qualified = self.scope.qualified_lane(self.name.as_str());

        let outcome = self
            .run(
                LaneStep::RemoveRemote,
                ToolInvocation::new([
                    "lane",
                    "remove",
                    qualified.as_str(),
                    "--remote",
                    "--silent",
                    "--force",
                ]),
            )
            .await;

        self.state = LaneState::RemoteCleaned;
        if outcome.is_ok() {
            tracing::info!(lane = %qualified, "stale remote lane removed");
        }
        outcome
    }

    /// Exports the lane to the remote scope.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError`] when the remote cleanup step has not run or the
    /// export fails.
    pub async fn export(&mut self) -> Result<(), LaneError> {
        self.require(LaneStep::Export, &[LaneState::RemoteCleaned])?;
        self.run(LaneStep::Export, ToolInvocation::new(["export"]))
            .await?;

        tracing::info!(lane = self.name.as_str(), "lane exported");
        self.state = LaneState::Exported;
        Ok(())
    }

    /// Marks the lifecycle complete and returns the published lane.
    ///
    /// # Errors
    ///
    /// Returns [`LaneError::OutOfOrder`] unless the lane was exported.
    pub fn finish(&mut self) -> Result<LaneName, LaneError> {
        self.require(LaneStep::Finish, &[LaneState::Exported])?;
        self.state = LaneState::Done;
        Ok(self.name.clone())
    }
}

#[cfg(test)]
mod tests;
