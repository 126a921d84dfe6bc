//! Octocrab client construction and rate-limit aware error mapping.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::GitHubError;
use crate::github::locator::{PersonalAccessToken, PullRequestLocator};
use crate::github::rate_limit::RateLimitInfo;

use super::error_mapping::{is_rate_limit_error, map_octocrab_error};

/// Octocrab-backed gateway implementing the comment and label traits.
pub struct OctocrabGateway {
    pub(super) client: Octocrab,
}

impl OctocrabGateway {
    /// Creates a new gateway from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an authenticated Octocrab client for the locator's API base.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when the base URI cannot be parsed or
    /// `GitHubError::Api` when Octocrab fails to construct a client.
    pub fn for_token(
        token: &PersonalAccessToken,
        locator: &PullRequestLocator,
    ) -> Result<Self, GitHubError> {
        let base_uri = locator
            .api_base()
            .as_str()
            .parse::<Uri>()
            .map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;

        let client = Octocrab::builder()
            .personal_token(token.value())
            .base_uri(base_uri)
            .map_err(|error| GitHubError::Api {
                message: format!("build client failed: {error}"),
            })?
            .build()
            .map_err(|error| map_octocrab_error("build client", &error))?;

        Ok(Self::new(client))
    }

    /// Maps an Octocrab error, attaching current rate limit counters when
    /// the failure is a rate limit.
    pub(super) async fn map_error(&self, operation: &str, error: &octocrab::Error) -> GitHubError {
        match error {
            octocrab::Error::GitHub { source, .. } if is_rate_limit_error(source) => {
                let rate_limit = self.fetch_rate_limit_info().await;
                let base_message =
                    format!("{operation} failed: {message}", message = source.message);
                let message = match &rate_limit {
                    Some(info) if info.is_exhausted() => format!(
                        "{base_message} (quota exhausted, resets at {reset})",
                        reset = info.reset_at()
                    ),
                    Some(info) => format!(
                        "{base_message} (resets at {reset})",
                        reset = info.reset_at()
                    ),
                    None => base_message,
                };

                GitHubError::RateLimitExceeded {
                    rate_limit,
                    message,
                }
            }
            _ => map_octocrab_error(operation, error),
        }
    }

    async fn fetch_rate_limit_info(&self) -> Option<RateLimitInfo> {
        let rate = self.client.ratelimit().get().await.ok()?.rate;
        let remaining = u32::try_from(rate.remaining).ok()?;
        Some(RateLimitInfo::new(remaining, rate.reset))
    }
}
