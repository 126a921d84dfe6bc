//! Applies a [`LabelPlan`](super::LabelPlan) through the label gateway.

use super::backoff::BackoffPolicy;
use super::plan::plan_labels;
use super::VersionLabel;
use crate::error::PipelineError;
use crate::github::pagination::collect_until_empty;
use crate::github::{GitHubError, Label, LabelGateway, PAGE_SIZE, PullRequestLocator};

/// Names touched by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Labels created in the catalog.
    pub created: Vec<String>,
    /// Labels detached from the pull request.
    pub removed: Vec<String>,
    /// Labels attached to the pull request.
    pub attached: Vec<String>,
    /// Labels whose creation or removal failed and was skipped.
    pub skipped: Vec<String>,
}

impl ReconcileReport {
    /// Number of create and remove calls that took effect.
    #[must_use]
    pub fn mutation_count(&self) -> usize {
        self.created.len() + self.removed.len()
    }
}

enum Creation {
    Created,
    AlreadyExists,
    Skipped,
}

/// Brings a pull request's version labels in line with its changes.
pub struct LabelReconciler<'deps, Gateway, Backoff>
where
    Gateway: LabelGateway + ?Sized,
    Backoff: BackoffPolicy + ?Sized,
{
    gateway: &'deps Gateway,
    locator: &'deps PullRequestLocator,
    backoff: &'deps Backoff,
}

impl<'deps, Gateway, Backoff> LabelReconciler<'deps, Gateway, Backoff>
where
    Gateway: LabelGateway + ?Sized,
    Backoff: BackoffPolicy + ?Sized,
{
    /// Creates a reconciler for the pull request at `locator`.
    #[must_use]
    pub const fn new(
        gateway: &'deps Gateway,
        locator: &'deps PullRequestLocator,
        backoff: &'deps Backoff,
    ) -> Self {
        Self {
            gateway,
            locator,
            backoff,
        }
    }

    /// Removes stale version labels, creates missing ones and attaches the
    /// desired set in one batch.
    ///
    /// Per-label failures are logged and recorded as skipped. A rate-limited
    /// creation is retried once after the backoff policy's wait.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::LabelOperation`] when the remote labels
    /// cannot be listed or the batch attach fails.
    pub async fn reconcile(
        &self,
        desired: &[VersionLabel],
        clear_all: bool,
    ) -> Result<ReconcileReport, PipelineError> {
        let attached = self.collect_attached().await?;
        let catalog = self.collect_catalog().await?;
        let plan = plan_labels(desired, &attached, &catalog, clear_all);
        tracing::debug!(
            remove = plan.to_remove.len(),
            create = plan.to_create.len(),
            attach = plan.to_attach.len(),
            clear_all,
            "label plan computed"
        );

        let mut report = ReconcileReport::default();
        for name in &plan.to_remove {
            self.remove(name, &mut report).await;
        }

        let mut unavailable = Vec::new();
        for label in &plan.to_create {
            match self.create(label).await {
                Creation::Created => report.created.push(label.name().to_owned()),
                Creation::AlreadyExists => {}
                Creation::Skipped => {
                    report.skipped.push(label.name().to_owned());
                    unavailable.push(label.name());
                }
            }
        }

        let batch: Vec<String> = plan
            .to_attach
            .into_iter()
            .filter(|name| !unavailable.contains(&name.as_str()))
            .collect();
        if !batch.is_empty() {
            self.gateway
                .add_labels(self.locator, &batch)
                .await
                .map_err(|error| label_error("attach labels", &error))?;
            tracing::info!(labels = ?batch, "version labels attached");
            report.attached = batch;
        }

        Ok(report)
    }

    async fn collect_attached(&self) -> Result<Vec<Label>, PipelineError> {
        collect_until_empty(PAGE_SIZE, |page| {
            self.gateway.list_issue_labels(self.locator, page)
        })
        .await
        .map_err(|error| label_error("list pull request labels", &error))
    }

    async fn collect_catalog(&self) -> Result<Vec<Label>, PipelineError> {
        collect_until_empty(PAGE_SIZE, |page| {
            self.gateway.list_repository_labels(self.locator, page)
        })
        .await
        .map_err(|error| label_error("list repository labels", &error))
    }

    async fn remove(&self, name: &str, report: &mut ReconcileReport) {
        match self.gateway.remove_label(self.locator, name).await {
            Ok(()) => {
                tracing::info!(label = name, "stale version label removed");
                report.removed.push(name.to_owned());
            }
            Err(GitHubError::NotFound { .. }) => {
                tracing::debug!(label = name, "label already detached");
            }
            Err(error) => {
                tracing::warn!(label = name, "could not remove label: {error}");
                report.skipped.push(name.to_owned());
            }
        }
    }

    async fn create(&self, label: &VersionLabel) -> Creation {
        let mut outcome = self.gateway.create_label(self.locator, &label.to_label()).await;
        if outcome.as_ref().is_err_and(GitHubError::is_rate_limited) {
            tracing::warn!(label = label.name(), "rate limited creating label, retrying once");
            self.backoff.wait().await;
            outcome = self.gateway.create_label(self.locator, &label.to_label()).await;
        }

        match outcome {
            Ok(()) => {
                tracing::info!(label = label.name(), "version label created");
                Creation::Created
            }
            Err(GitHubError::Validation { .. }) => {
                tracing::debug!(label = label.name(), "label already exists");
                Creation::AlreadyExists
            }
            Err(error) => {
                tracing::warn!(label = label.name(), "skipping label: {error}");
                Creation::Skipped
            }
        }
    }
}

fn label_error(action: &str, error: &GitHubError) -> PipelineError {
    PipelineError::LabelOperation {
        message: format!("failed to {action}: {error}"),
    }
}
