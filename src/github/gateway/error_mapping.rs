//! Translation of Octocrab failures into [`GitHubError`] variants.

use http::StatusCode;

use crate::github::error::GitHubError;

const fn is_auth_failure(status: StatusCode) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
}

const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Checks whether the GitHub error is a primary or secondary rate limit,
/// judged by status code plus message or documentation URL.
pub(super) fn is_rate_limit_error(source: &octocrab::GitHubError) -> bool {
    let is_rate_limit_status = matches!(
        source.status_code,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    );

    let message_indicates_rate_limit = source.message.to_lowercase().contains("rate limit")
        || source
            .documentation_url
            .as_deref()
            .is_some_and(|url| url.contains("rate-limit"));

    is_rate_limit_status && message_indicates_rate_limit
}

fn map_github_status(operation: &str, source: &octocrab::GitHubError) -> GitHubError {
    let status = source.status_code;
    let message = format!(
        "{operation} failed with status {status}: {detail}",
        detail = source.message
    );

    match status {
        StatusCode::NOT_FOUND => GitHubError::NotFound { message },
        StatusCode::UNPROCESSABLE_ENTITY => GitHubError::Validation { message },
        _ if is_auth_failure(status) => GitHubError::Authentication { message },
        _ => GitHubError::Api { message },
    }
}

/// Maps an Octocrab error without consulting the rate limit endpoint.
pub(super) fn map_octocrab_error(operation: &str, error: &octocrab::Error) -> GitHubError {
    if let octocrab::Error::GitHub { source, .. } = error {
        if is_rate_limit_error(source) {
            return GitHubError::RateLimitExceeded {
                rate_limit: None,
                message: format!("{operation} failed: {}", source.message),
            };
        }
        return map_github_status(operation, source);
    }

    if is_network_error(error) {
        return GitHubError::Network {
            message: format!("{operation} failed: {error}"),
        };
    }

    GitHubError::Api {
        message: format!("{operation} failed: {error}"),
    }
}
