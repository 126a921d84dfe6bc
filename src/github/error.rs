//! Error types exposed by the GitHub issue-tracking layer.

use thiserror::Error;

use super::rate_limit::RateLimitInfo;

/// Errors surfaced while parsing input or communicating with GitHub.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GitHubError {
    /// The repository slug could not be split into owner and name.
    #[error("repository must be given as <owner>/<repo>: {value}")]
    InvalidRepository {
        /// The rejected slug.
        value: String,
    },

    /// The pull request number is not a valid integer.
    #[error("pull request number must be a positive integer")]
    InvalidPullRequestNumber,

    /// The API base URL could not be parsed.
    #[error("GitHub API URL is invalid: {0}")]
    InvalidUrl(String),

    /// The authentication token was missing.
    #[error("GitHub token is required")]
    MissingToken,

    /// The authentication token was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401/403 response.
        message: String,
    },

    /// The addressed resource does not exist.
    #[error("GitHub resource not found: {message}")]
    NotFound {
        /// Response detail from GitHub.
        message: String,
    },

    /// GitHub rejected the payload, typically because the resource already
    /// exists.
    #[error("GitHub rejected the request: {message}")]
    Validation {
        /// Response detail from GitHub.
        message: String,
    },

    /// GitHub returned any other API error.
    #[error("GitHub API error: {message}")]
    Api {
        /// Response body from GitHub describing the failure.
        message: String,
    },

    /// Networking failed while calling GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// Rate limit exceeded - the API returned 403/429 with a rate limit
    /// message.
    #[error("GitHub API rate limit exceeded: {message}")]
    RateLimitExceeded {
        /// Rate limit info if available from the rate limit endpoint.
        rate_limit: Option<RateLimitInfo>,
        /// Error message from GitHub.
        message: String,
    },
}

impl GitHubError {
    /// Returns true when the failure is a rate-limit signal worth retrying.
    #[must_use]
    pub const fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitExceeded { .. })
    }
}
