//! Data models representing issue comments and labels.
//!
//! Types prefixed with `Api` are internal deserialisation targets that
//! convert into public domain types.

use serde::{Deserialize, Serialize};

/// Issue comment attached to a pull request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueComment {
    /// Comment identifier.
    pub id: u64,
    /// Comment body.
    pub body: Option<String>,
    /// Author login.
    pub author: Option<String>,
}

impl IssueComment {
    /// Returns true when the comment was written by `login` and mentions
    /// `marker` anywhere in its body.
    #[must_use]
    pub fn is_marked_by(&self, login: &str, marker: &str) -> bool {
        self.author.as_deref() == Some(login)
            && self
                .body
                .as_deref()
                .is_some_and(|body| body.contains(marker))
    }
}

/// Label as stored in the repository catalog or attached to an issue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Label {
    /// Label name, unique within the repository.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Hex colour without a leading `#`.
    pub color: Option<String>,
}

impl Label {
    /// Creates a label carrying only a name.
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiComment {
    pub(crate) id: u64,
    pub(crate) body: Option<String>,
    pub(crate) user: Option<ApiUser>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiUser {
    pub(crate) login: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiLabel {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) color: Option<String>,
}

/// Request body for creating or editing an issue comment.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct CommentPayload<'a> {
    pub(crate) body: &'a str,
}

/// Request body for creating a repository label.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct LabelPayload<'a> {
    pub(crate) name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) description: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) color: Option<&'a str>,
}

/// Request body for attaching labels to an issue.
#[derive(Debug, Clone, Serialize)]
pub(crate) struct AttachLabelsPayload<'a> {
    pub(crate) labels: &'a [String],
}

impl From<ApiComment> for IssueComment {
    fn from(value: ApiComment) -> Self {
        Self {
            id: value.id,
            body: value.body,
            author: value.user.and_then(|user| user.login),
        }
    }
}

impl From<ApiLabel> for Label {
    fn from(value: ApiLabel) -> Self {
        Self {
            name: value.name,
            description: value.description,
            color: value.color,
        }
    }
}
