//! Error types for local repository inspection.

use thiserror::Error;

/// Errors that may occur while reading the workspace repository.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LocalRepositoryError {
    /// The workspace is not within a Git repository.
    #[error("not inside a Git repository")]
    NotARepository,

    /// `HEAD` does not point at a commit yet.
    #[error("repository has no commits")]
    NoCommits,

    /// Git operation failed.
    #[error("git error: {message}")]
    Git {
        /// Error detail from the git2 library.
        message: String,
    },
}

impl From<git2::Error> for LocalRepositoryError {
    fn from(error: git2::Error) -> Self {
        Self::Git {
            message: error.message().to_owned(),
        }
    }
}
