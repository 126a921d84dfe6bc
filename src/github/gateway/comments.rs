//! Issue comment operations for [`OctocrabGateway`].

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{ApiComment, CommentPayload, IssueComment};
use crate::github::pagination::PageRequest;

use super::CommentGateway;
use super::client::OctocrabGateway;

#[async_trait]
impl CommentGateway for OctocrabGateway {
    async fn list_comments(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        match self
            .client
            .get::<Vec<ApiComment>, _, _>(locator.comments_path(), Some(&page))
            .await
        {
            Ok(comments) => Ok(comments.into_iter().map(IssueComment::from).collect()),
            Err(error) => Err(self.map_error("list issue comments", &error).await),
        }
    }

    async fn create_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        let payload = CommentPayload { body };
        match self
            .client
            .post::<_, ApiComment>(locator.comments_path(), Some(&payload))
            .await
        {
            Ok(comment) => Ok(comment.into()),
            Err(error) => Err(self.map_error("create issue comment", &error).await),
        }
    }

    async fn update_comment(
        &self,
        locator: &PullRequestLocator,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        let payload = CommentPayload { body };
        match self
            .client
            .patch::<ApiComment, _, _>(locator.comment_path(comment_id), Some(&payload))
            .await
        {
            Ok(comment) => Ok(comment.into()),
            Err(error) => Err(self.map_error("update issue comment", &error).await),
        }
    }
}
