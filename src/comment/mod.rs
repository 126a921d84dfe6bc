//! The single bot status comment on a pull request.
//!
//! The comment is found again on every run by author and content marker,
//! never by a stored id. A timestamp line records whether this run created
//! or updated it.

mod body;
mod clock;

pub use body::{LANE_LINK_PREFIX, lane_comment_body, unchanged_comment_body};
#[cfg(any(test, feature = "test-support"))]
pub use clock::FixedClock;
pub use clock::{Clock, SystemClock};

use crate::error::PipelineError;
use crate::github::pagination::collect_until_empty;
use crate::github::{CommentGateway, GitHubError, PAGE_SIZE, PullRequestLocator};

/// Login GitHub Actions posts as with the default workflow token.
pub const DEFAULT_BOT_LOGIN: &str = "github-actions[bot]";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// What an upsert did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    /// A new comment was posted.
    Created {
        /// New comment id.
        id: u64,
    },
    /// An earlier bot comment was rewritten.
    Updated {
        /// Rewritten comment id.
        id: u64,
    },
}

/// Creates or updates the bot's status comment.
pub struct CommentUpserter<'deps, Gateway, Time>
where
    Gateway: CommentGateway + ?Sized,
    Time: Clock + ?Sized,
{
    gateway: &'deps Gateway,
    locator: &'deps PullRequestLocator,
    clock: &'deps Time,
    bot_login: &'deps str,
}

impl<'deps, Gateway, Time> CommentUpserter<'deps, Gateway, Time>
where
    Gateway: CommentGateway + ?Sized,
    Time: Clock + ?Sized,
{
    /// Creates an upserter matching comments authored by `bot_login`.
    #[must_use]
    pub const fn new(
        gateway: &'deps Gateway,
        locator: &'deps PullRequestLocator,
        clock: &'deps Time,
        bot_login: &'deps str,
    ) -> Self {
        Self {
            gateway,
            locator,
            clock,
            bot_login,
        }
    }

    /// Rewrites the first bot comment containing `marker` with `body`, or
    /// posts a new comment when none exists.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::CommentOperation`] when comments cannot be
    /// listed, created or updated.
    pub async fn upsert(&self, marker: &str, body: &str) -> Result<UpsertOutcome, PipelineError> {
        let comments = collect_until_empty(PAGE_SIZE, |page| {
            self.gateway.list_comments(self.locator, page)
        })
        .await
        .map_err(|error| comment_error("list comments", &error))?;

        let stamp = self.clock.now().format(TIMESTAMP_FORMAT);
        let existing = comments
            .iter()
            .find(|comment| comment.is_marked_by(self.bot_login, marker))
            .map(|comment| comment.id);

        if let Some(id) = existing {
            let stamped = format!("{body}\n\n_Updated: {stamp}_");
            self.gateway
                .update_comment(self.locator, id, &stamped)
                .await
                .map_err(|error| comment_error("update comment", &error))?;
            tracing::info!(comment_id = id, "status comment updated");
            Ok(UpsertOutcome::Updated { id })
        } else {
            let stamped = format!("{body}\n\n_Created: {stamp}_");
            let created = self
                .gateway
                .create_comment(self.locator, &stamped)
                .await
                .map_err(|error| comment_error("create comment", &error))?;
            tracing::info!(comment_id = created.id, "status comment created");
            Ok(UpsertOutcome::Created { id: created.id })
        }
    }
}

fn comment_error(action: &str, error: &GitHubError) -> PipelineError {
    PipelineError::CommentOperation {
        message: format!("failed to {action}: {error}"),
    }
}
