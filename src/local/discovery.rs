//! `HEAD` inspection backed by git2.

use camino::{Utf8Path, Utf8PathBuf};
use git2::{ErrorCode, Repository};

use super::error::LocalRepositoryError;

/// The commit checked out in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadCommit {
    message: String,
    branch: Option<String>,
}

impl HeadCommit {
    /// Creates a head description from a full commit message and the
    /// checked-out branch, if any.
    #[must_use]
    pub fn new(message: impl Into<String>, branch: Option<String>) -> Self {
        Self {
            message: message.into(),
            branch,
        }
    }

    /// First non-blank line of the message, trimmed.
    #[must_use]
    pub fn summary(&self) -> Option<&str> {
        self.message
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
    }

    /// Short name of the checked-out branch; `None` on a detached `HEAD`.
    #[must_use]
    pub fn branch(&self) -> Option<&str> {
        self.branch.as_deref()
    }
}

/// Source of the workspace's `HEAD` commit.
pub trait CommitSource: Send + Sync {
    /// Reads the commit currently checked out.
    ///
    /// # Errors
    ///
    /// Returns [`LocalRepositoryError`] when no repository or commit can be
    /// found.
    fn head(&self) -> Result<HeadCommit, LocalRepositoryError>;
}

/// Reads `HEAD` from the repository enclosing a workspace directory.
#[derive(Debug, Clone)]
pub struct Git2CommitSource {
    start: Utf8PathBuf,
}

impl Git2CommitSource {
    /// Searches upward from `start` for the repository on each read.
    #[must_use]
    pub fn new(start: &Utf8Path) -> Self {
        Self {
            start: start.to_owned(),
        }
    }
}

impl CommitSource for Git2CommitSource {
    fn head(&self) -> Result<HeadCommit, LocalRepositoryError> {
        let repo = Repository::discover(self.start.as_std_path()).map_err(|error| {
            if error.code() == ErrorCode::NotFound {
                LocalRepositoryError::NotARepository
            } else {
                LocalRepositoryError::from(error)
            }
        })?;

        let head = repo.head().map_err(|error| match error.code() {
            ErrorCode::UnbornBranch | ErrorCode::NotFound => LocalRepositoryError::NoCommits,
            _ => LocalRepositoryError::from(error),
        })?;
        let branch = if head.is_branch() {
            head.shorthand().map(str::to_owned)
        } else {
            None
        };
        let commit = head.peel_to_commit()?;
        let message = String::from_utf8_lossy(commit.message_bytes()).into_owned();

        Ok(HeadCommit::new(message, branch))
    }
}
