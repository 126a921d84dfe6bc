//! Label catalog and issue label operations for [`OctocrabGateway`].

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ApiLabel, AttachLabelsPayload, Label, LabelPayload};
use crate::github::pagination::PageRequest;

use super::LabelGateway;
use super::client::OctocrabGateway;

impl OctocrabGateway {
    async fn list_labels_at(
        &self,
        operation: &str,
        route: String,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError> {
        match self
            .client
            .get::<Vec<ApiLabel>, _, _>(route, Some(&page))
            .await
        {
            Ok(labels) => Ok(labels.into_iter().map(Label::from).collect()),
            Err(error) => Err(self.map_error(operation, &error).await),
        }
    }
}

#[async_trait]
impl LabelGateway for OctocrabGateway {
    async fn list_issue_labels(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError> {
        self.list_labels_at("list issue labels", locator.issue_labels_path(), page)
            .await
    }

    async fn list_repository_labels(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError> {
        self.list_labels_at(
            "list repository labels",
            locator.repository_labels_path(),
            page,
        )
        .await
    }

    async fn create_label(
        &self,
        locator: &PullRequestLocator,
        label: &Label,
    ) -> Result<(), GitHubError> {
        let payload = LabelPayload {
            name: label.name.as_str(),
            description: label.description.as_deref(),
            color: label.color.as_deref(),
        };
        match self
            .client
            .post::<_, ApiLabel>(locator.repository_labels_path(), Some(&payload))
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => Err(self
                .map_error(&format!("create label {}", label.name), &error)
                .await),
        }
    }

    async fn add_labels(
        &self,
        locator: &PullRequestLocator,
        names: &[String],
    ) -> Result<(), GitHubError> {
        let payload = AttachLabelsPayload { labels: names };
        match self
            .client
            .post::<_, Vec<ApiLabel>>(locator.issue_labels_path(), Some(&payload))
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => Err(self.map_error("attach labels", &error).await),
        }
    }

    async fn remove_label(
        &self,
        locator: &PullRequestLocator,
        name: &str,
    ) -> Result<(), GitHubError> {
        match self
            .client
            .delete::<Vec<ApiLabel>, _, _>(locator.issue_label_path(name), None::<&()>)
            .await
        {
            Ok(_) => Ok(()),
            Err(error) => Err(self
                .map_error(&format!("remove label {name}"), &error)
                .await),
        }
    }
}
