//! Sequencing of one publish run.
//!
//! `gate -> status -> labels -> build -> lane -> comment`. Each stage's
//! outcome is settled against [`Stage::policy`], the single table deciding
//! which failures abort the run.

mod settings;
mod stage;

pub use settings::{
    DEFAULT_MIN_TOOL_VERSION, PipelineConfig, VersionLabelSettings, compile_lane_pattern,
};
pub use stage::{FailurePolicy, Stage};

use crate::comment::{Clock, CommentUpserter, lane_comment_body, unchanged_comment_body};
use crate::error::PipelineError;
use crate::gate::{RegistryClient, VersionGate};
use crate::github::{CommentGateway, LabelGateway};
use crate::labels::{BackoffPolicy, LabelReconciler, desired_labels};
use crate::lane::{LaneLifecycle, LaneName, SnapMessage};
use crate::local::{CommitSource, HeadCommit};
use crate::status::{ChangeStatus, StatusInspector};
use crate::telemetry::{TelemetryEvent, TelemetrySink};
use crate::tool::{BuildTool, ToolInvocation};

/// External systems a run talks to.
#[derive(Clone, Copy)]
pub struct Collaborators<'deps> {
    /// Build tool driving the workspace.
    pub tool: &'deps dyn BuildTool,
    /// Registry scope lookup.
    pub registry: &'deps dyn RegistryClient,
    /// Pull request comments.
    pub comments: &'deps dyn CommentGateway,
    /// Pull request and repository labels.
    pub labels: &'deps dyn LabelGateway,
    /// Workspace `HEAD`.
    pub commits: &'deps dyn CommitSource,
    /// Wait before retrying a rate-limited label creation.
    pub backoff: &'deps dyn BackoffPolicy,
    /// Comment timestamps.
    pub clock: &'deps dyn Clock,
    /// Stage outcome events.
    pub telemetry: &'deps dyn TelemetrySink,
}

/// Result of a successful run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// The lane was exported and the status comment points at it.
    Published {
        /// Exported lane.
        lane: LaneName,
        /// Page of the lane on the registry.
        url: String,
    },
    /// No component was new or modified; nothing was published.
    NothingToPublish,
}

/// Runs the publish pipeline for one pull request.
pub struct Orchestrator<'deps> {
    config: PipelineConfig,
    deps: Collaborators<'deps>,
}

impl<'deps> Orchestrator<'deps> {
    /// Creates an orchestrator for `config` using `deps`.
    #[must_use]
    pub const fn new(config: PipelineConfig, deps: Collaborators<'deps>) -> Self {
        Self { config, deps }
    }

    /// Configuration of this run.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every stage in order.
    ///
    /// # Errors
    ///
    /// Returns the first error of a strict stage. Failures of lenient stages
    /// are logged and recorded as telemetry only.
    pub async fn run(&self) -> Result<PipelineOutcome, PipelineError> {
        let status = self.preflight().await?;
        let marker = self.config.lane_url_prefix();

        if status.is_unchanged() {
            tracing::info!("no new or modified components, nothing to publish");
            for stage in Stage::PUBLISHING {
                self.skip(stage, "no new or modified components");
            }
            if self.config.comment_when_unchanged {
                let upserted = self
                    .upserter()
                    .upsert(&marker, &unchanged_comment_body(&marker))
                    .await;
                self.settle(Stage::Comment, upserted)?;
            } else {
                self.skip(Stage::Comment, "nothing to report");
            }
            return Ok(PipelineOutcome::NothingToPublish);
        }

        self.reconcile_labels(&status).await?;
        self.build().await?;
        let lane = self.publish_lane().await?;

        let url = self
            .config
            .scope
            .lane_url(&self.config.registry_host, lane.as_str());
        let upserted = self
            .upserter()
            .upsert(&marker, &lane_comment_body(&url, &status))
            .await;
        self.settle(Stage::Comment, upserted)?;

        tracing::info!(lane = %lane, %url, "lane published");
        Ok(PipelineOutcome::Published { lane, url })
    }

    async fn preflight(&self) -> Result<ChangeStatus, PipelineError> {
        let gate = VersionGate::new(self.deps.tool, self.deps.registry);
        let version = gate
            .check_tool_version(&self.config.min_tool_version)
            .await;
        self.settle(Stage::ToolVersion, version)?;
        let access = gate.check_scope_access(&self.config.scope).await;
        self.settle(Stage::ScopeAccess, access)?;

        let status = StatusInspector::new(self.deps.tool).obtain().await;
        self.settle(Stage::Status, status)?
            .ok_or_else(|| PipelineError::StatusParse {
                message: "status report unavailable".to_owned(),
            })
    }

    async fn reconcile_labels(&self, status: &ChangeStatus) -> Result<(), PipelineError> {
        let Some(settings) = &self.config.version_labels else {
            self.skip(Stage::Labels, "version labels disabled");
            return Ok(());
        };

        let desired = desired_labels(
            &status.changed_components(),
            settings.bump,
            &settings.palette,
        );
        let reconciler = LabelReconciler::new(
            self.deps.labels,
            &self.config.pull_request,
            self.deps.backoff,
        );
        let report = reconciler.reconcile(&desired, settings.clear_all).await;
        if let Some(report) = self.settle(Stage::Labels, report)? {
            tracing::debug!(?report, "labels reconciled");
        }
        Ok(())
    }

    async fn build(&self) -> Result<(), PipelineError> {
        if self.config.skip_build {
            self.skip(Stage::Build, "build disabled");
            return Ok(());
        }

        let built = self
            .deps
            .tool
            .run(&ToolInvocation::new(["build"]))
            .await
            .map(|_| ())
            .map_err(|error| PipelineError::Tool {
                operation: "build".to_owned(),
                message: error.to_string(),
            });
        self.settle(Stage::Build, built).map(|_| ())
    }

    async fn publish_lane(&self) -> Result<LaneName, PipelineError> {
        let head = self
            .deps
            .commits
            .head()
            .inspect_err(|error| tracing::debug!("workspace HEAD unavailable: {error}"))
            .ok();
        let branch = self
            .config
            .branch
            .as_deref()
            .or_else(|| head.as_ref().and_then(HeadCommit::branch));
        let name = LaneName::derive(
            self.config.pull_request.number().get(),
            branch,
            &self.config.lane_branch_pattern,
        )?;
        let message = SnapMessage::resolve(
            self.config.pr_title.as_deref(),
            head.as_ref().and_then(HeadCommit::summary),
        );

        let mut lifecycle = LaneLifecycle::new(self.deps.tool, self.config.scope.clone(), name);
        let ensured = lifecycle.ensure_lane().await.map_err(PipelineError::from);
        self.settle(Stage::EnsureLane, ensured)?;
        let snapped = lifecycle.snap(&message).await.map_err(PipelineError::from);
        self.settle(Stage::Snap, snapped)?;
        let removed = lifecycle
            .remove_remote_lane()
            .await
            .map_err(PipelineError::from);
        self.settle(Stage::RemoveRemoteLane, removed)?;
        let exported = lifecycle.export().await.map_err(PipelineError::from);
        self.settle(Stage::Export, exported)?;

        lifecycle.finish().map_err(PipelineError::from)
    }

    fn upserter(&self) -> CommentUpserter<'_, dyn CommentGateway + '_, dyn Clock + '_> {
        CommentUpserter::new(
            self.deps.comments,
            &self.config.pull_request,
            self.deps.clock,
            &self.config.bot_login,
        )
    }

    /// Applies `stage`'s failure policy to `result`.
    ///
    /// Returns `Ok(None)` for a tolerated failure.
    fn settle<T>(
        &self,
        stage: Stage,
        result: Result<T, PipelineError>,
    ) -> Result<Option<T>, PipelineError> {
        match result {
            Ok(value) => {
                tracing::debug!(%stage, "stage completed");
                self.deps.telemetry.record(TelemetryEvent::StageCompleted {
                    stage: stage.name().to_owned(),
                });
                Ok(Some(value))
            }
            Err(error) if stage.policy() == FailurePolicy::Lenient => {
                tracing::warn!(%stage, "continuing after failure: {error}");
                self.deps.telemetry.record(TelemetryEvent::StageTolerated {
                    stage: stage.name().to_owned(),
                    message: error.to_string(),
                });
                Ok(None)
            }
            Err(error) => {
                tracing::error!(%stage, "stage failed: {error}");
                Err(error)
            }
        }
    }

    fn skip(&self, stage: Stage, reason: &str) {
        tracing::debug!(%stage, reason, "stage skipped");
        self.deps.telemetry.record(TelemetryEvent::StageSkipped {
            stage: stage.name().to_owned(),
            reason: reason.to_owned(),
        });
    }
}
