//! In-memory GitHub double for reconciler and pipeline tests.
//!
//! # Examples
//!
//! ```
//! use lanesync::github::test_support::InMemoryGitHub;
//!
//! let github = InMemoryGitHub::new()
//!     .with_catalog_label("bug")
//!     .with_attached_label("bug");
//! assert_eq!(github.attached_labels(), vec!["bug".to_owned()]);
//! ```

use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::error::GitHubError;
use super::gateway::{CommentGateway, LabelGateway};
use super::locator::PullRequestLocator;
use super::models::{IssueComment, Label};
use super::pagination::PageRequest;

/// One call received by [`InMemoryGitHub`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GitHubCall {
    /// A page of issue comments was listed.
    ListComments {
        /// Requested page number.
        page: u32,
    },
    /// A comment was created.
    CreateComment,
    /// A comment body was replaced.
    UpdateComment {
        /// Target comment.
        id: u64,
    },
    /// A page of attached labels was listed.
    ListIssueLabels {
        /// Requested page number.
        page: u32,
    },
    /// A page of the label catalog was listed.
    ListRepositoryLabels {
        /// Requested page number.
        page: u32,
    },
    /// A catalog label creation was attempted.
    CreateLabel {
        /// Label name.
        name: String,
    },
    /// Labels were attached in one batch.
    AddLabels {
        /// Attached names, in request order.
        names: Vec<String>,
    },
    /// A label was detached from the pull request.
    RemoveLabel {
        /// Label name.
        name: String,
    },
}

impl GitHubCall {
    /// Returns true for calls that mutate labels or the label catalog
    /// other than attaching.
    #[must_use]
    pub const fn is_label_create_or_remove(&self) -> bool {
        matches!(self, Self::CreateLabel { .. } | Self::RemoveLabel { .. })
    }
}

#[derive(Debug, Default)]
struct State {
    catalog: Vec<Label>,
    attached: Vec<String>,
    comments: Vec<IssueComment>,
    next_comment_id: u64,
    create_label_failures: HashMap<String, VecDeque<GitHubError>>,
    comment_write_failure: Option<GitHubError>,
    calls: Vec<GitHubCall>,
}

/// Shared in-memory stand-in for the comment and label endpoints of one
/// pull request.
#[derive(Debug, Default)]
pub struct InMemoryGitHub {
    state: Mutex<State>,
}

impl InMemoryGitHub {
    /// Creates an empty repository with no labels or comments.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a label to the repository catalog.
    #[must_use]
    pub fn with_catalog_label(self, name: &str) -> Self {
        self.state().catalog.push(Label::named(name));
        self
    }

    /// Attaches an existing or new label to the pull request.
    #[must_use]
    pub fn with_attached_label(self, name: &str) -> Self {
        {
            let mut state = self.state();
            if !state.catalog.iter().any(|label| label.name == name) {
                state.catalog.push(Label::named(name));
            }
            state.attached.push(name.to_owned());
        }
        self
    }

    /// Seeds an existing issue comment.
    #[must_use]
    pub fn with_comment(self, author: &str, body: &str) -> Self {
        {
            let mut state = self.state();
            state.next_comment_id += 1;
            let id = state.next_comment_id;
            state.comments.push(IssueComment {
                id,
                body: Some(body.to_owned()),
                author: Some(author.to_owned()),
            });
        }
        self
    }

    /// Queues errors returned by successive creation attempts of `name`
    /// before creation starts succeeding.
    #[must_use]
    pub fn with_label_creation_failures(self, name: &str, errors: Vec<GitHubError>) -> Self {
        self.state()
            .create_label_failures
            .insert(name.to_owned(), errors.into());
        self
    }

    /// Makes every comment create or update fail with `error`.
    #[must_use]
    pub fn with_comment_write_failure(self, error: GitHubError) -> Self {
        self.state().comment_write_failure = Some(error);
        self
    }

    /// Names of labels attached to the pull request.
    #[must_use]
    pub fn attached_labels(&self) -> Vec<String> {
        self.state().attached.clone()
    }

    /// The repository label catalog.
    #[must_use]
    pub fn catalog(&self) -> Vec<Label> {
        self.state().catalog.clone()
    }

    /// All issue comments in creation order.
    #[must_use]
    pub fn comments(&self) -> Vec<IssueComment> {
        self.state().comments.clone()
    }

    /// Every call received so far.
    #[must_use]
    pub fn calls(&self) -> Vec<GitHubCall> {
        self.state().calls.clone()
    }

    /// Forgets recorded calls, keeping repository state.
    pub fn clear_calls(&self) {
        self.state().calls.clear();
    }

    fn page_of<T: Clone>(items: &[T], page: PageRequest) -> Vec<T> {
        let per_page = usize::from(page.per_page());
        let index = usize::try_from(page.page().saturating_sub(1)).unwrap_or(usize::MAX);
        items
            .iter()
            .skip(index.saturating_mul(per_page))
            .take(per_page)
            .cloned()
            .collect()
    }

    fn record(&self, call: GitHubCall) {
        self.state().calls.push(call);
    }
}

#[async_trait]
impl CommentGateway for InMemoryGitHub {
    async fn list_comments(
        &self,
        _locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<IssueComment>, GitHubError> {
        self.record(GitHubCall::ListComments { page: page.page() });
        Ok(Self::page_of(&self.state().comments, page))
    }

    async fn create_comment(
        &self,
        _locator: &PullRequestLocator,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        self.record(GitHubCall::CreateComment);
        let mut state = self.state();
        if let Some(error) = state.comment_write_failure.clone() {
            return Err(error);
        }
        state.next_comment_id += 1;
        let comment = IssueComment {
            id: state.next_comment_id,
            body: Some(body.to_owned()),
            author: Some("github-actions[bot]".to_owned()),
        };
        state.comments.push(comment.clone());
        Ok(comment)
    }

    async fn update_comment(
        &self,
        _locator: &PullRequestLocator,
        comment_id: u64,
        body: &str,
    ) -> Result<IssueComment, GitHubError> {
        self.record(GitHubCall::UpdateComment { id: comment_id });
        let mut state = self.state();
        if let Some(error) = state.comment_write_failure.clone() {
            return Err(error);
        }
        let comment = state
            .comments
            .iter_mut()
            .find(|comment| comment.id == comment_id)
            .ok_or_else(|| GitHubError::NotFound {
                message: format!("comment {comment_id}"),
            })?;
        comment.body = Some(body.to_owned());
        Ok(comment.clone())
    }
}

#[async_trait]
impl LabelGateway for InMemoryGitHub {
    async fn list_issue_labels(
        &self,
        _locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError> {
        self.record(GitHubCall::ListIssueLabels { page: page.page() });
        let state = self.state();
        let attached: Vec<Label> = state
            .attached
            .iter()
            .map(|name| {
                state
                    .catalog
                    .iter()
                    .find(|label| &label.name == name)
                    .cloned()
                    .unwrap_or_else(|| Label::named(name.as_str()))
            })
            .collect();
        Ok(Self::page_of(&attached, page))
    }

    async fn list_repository_labels(
        &self,
        _locator: &PullRequestLocator,
        page: PageRequest,
    ) -> Result<Vec<Label>, GitHubError> {
        self.record(GitHubCall::ListRepositoryLabels { page: page.page() });
        Ok(Self::page_of(&self.state().catalog, page))
    }

    async fn create_label(
        &self,
        _locator: &PullRequestLocator,
        label: &Label,
    ) -> Result<(), GitHubError> {
        self.record(GitHubCall::CreateLabel {
            name: label.name.clone(),
        });
        let mut state = self.state();
        if let Some(error) = state
            .create_label_failures
            .get_mut(&label.name)
            .and_then(VecDeque::pop_front)
        {
            return Err(error);
        }
        if state.catalog.iter().any(|existing| existing.name == label.name) {
            return Err(GitHubError::Validation {
                message: format!("label {} already exists", label.name),
            });
        }
        state.catalog.push(label.clone());
        Ok(())
    }

    async fn add_labels(
        &self,
        _locator: &PullRequestLocator,
        names: &[String],
    ) -> Result<(), GitHubError> {
        self.record(GitHubCall::AddLabels {
            names: names.to_vec(),
        });
        let mut state = self.state();
        for name in names {
            if !state.catalog.iter().any(|label| &label.name == name) {
                state.catalog.push(Label::named(name.as_str()));
            }
            if !state.attached.contains(name) {
                state.attached.push(name.clone());
            }
        }
        Ok(())
    }

    async fn remove_label(
        &self,
        _locator: &PullRequestLocator,
        name: &str,
    ) -> Result<(), GitHubError> {
        self.record(GitHubCall::RemoveLabel {
            name: name.to_owned(),
        });
        let mut state = self.state();
        let before = state.attached.len();
        state.attached.retain(|attached| attached != name);
        if state.attached.len() == before {
            return Err(GitHubError::NotFound {
                message: format!("label {name} is not attached"),
            });
        }
        Ok(())
    }
}
