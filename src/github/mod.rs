//! GitHub issue-tracking access for pull request comments and labels.
//!
//! This module wraps Octocrab behind small gateway traits so the label and
//! comment reconcilers can be exercised against fakes. Octocrab errors are
//! mapped into [`GitHubError`] variants so callers can tell rate limits,
//! missing resources and validation failures apart without touching Octocrab
//! types.

pub mod error;
pub mod gateway;
pub mod locator;
pub mod models;
pub mod pagination;
pub mod rate_limit;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use error::GitHubError;
pub use gateway::{CommentGateway, LabelGateway, OctocrabGateway};
pub use locator::{
    DEFAULT_API_BASE, PersonalAccessToken, PullRequestLocator, PullRequestNumber, RepositoryName,
    RepositoryOwner,
};
pub use models::{IssueComment, Label};
pub use pagination::{PAGE_SIZE, PageRequest};
pub use rate_limit::RateLimitInfo;

#[cfg(test)]
pub use gateway::MockLabelGateway;
