//! Gateways for reading and mutating pull request metadata through Octocrab.
//!
//! This module provides trait-based gateways for communicating with the GitHub
//! API. The traits let the reconcilers run against in-memory fakes in tests
//! while the Octocrab implementation handles real HTTP requests.

mod client;
mod comments;
mod error_mapping;
mod labels;

pub use client::OctocrabGateway;

use async_trait::async_trait;

use crate::github::error::GitHubError;
use crate::github::locator::PullRequestLocator;
use crate::github::models::{IssueComment, Label};
use crate::github::pagination::PageRequest;

/// Gateway for the issue comments of a pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CommentGateway: Send + Sync {
    /// Fetch one page of issue comments.
    async fn list_comments(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<IssueComment>, GitHubError>;

    /// Create a new issue comment.
    async fn create_comment(
        &self,
        locator: &PullRequestLocator,
        body: &str,
    ) -> Result<IssueComment, GitHubError>;

    /// Replace the body of an existing issue comment.
    async fn update_comment(
        &self,
        locator: &PullRequestLocator,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, GitHubError>;
}

/// Gateway for repository labels and the labels attached to a pull request.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LabelGateway: Send + Sync {
    /// Fetch one page of labels attached to the pull request.
    async fn list_issue_labels(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError>;

    /// Fetch one page of the repository label catalog.
    async fn list_repository_labels(
        &self,
        locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError>;

    /// Create a label in the repository catalog.
    async fn create_label(
        &self,
        locator: &PullRequestLocator,
        label: &Label,
    ) -> Result<(), GitHubError>;

    /// Attach labels to the pull request in one call.
    async fn add_labels(
        &self,
        locator: &PullRequestLocator,
        names: &[String],
    ) -> Result<(), GitHubError>;

    /// Detach a label from the pull request. The catalog entry is untouched.
    async fn remove_label(
        &self,
        locator: &PullRequestLocator,
        name: &str,
    ) -> Result<(), GitHubError>;
}

#[cfg(test)]
mod tests;
