//! Fixed [`CommitSource`] for tests that never touch a repository.

use super::{CommitSource, HeadCommit, LocalRepositoryError};

/// Commit source returning the same answer on every read.
#[derive(Debug, Clone)]
pub struct StaticCommitSource {
    head: Result<HeadCommit, LocalRepositoryError>,
}

impl StaticCommitSource {
    /// A workspace whose `HEAD` has `message` on `branch`.
    #[must_use]
    pub fn new(message: &str, branch: Option<&str>) -> Self {
        Self {
            head: Ok(HeadCommit::new(message, branch.map(str::to_owned))),
        }
    }

    /// A workspace outside any repository.
    #[must_use]
    pub const fn missing() -> Self {
        Self {
            head: Err(LocalRepositoryError::NotARepository),
        }
    }
}

impl CommitSource for StaticCommitSource {
    fn head(&self) -> Result<HeadCommit, LocalRepositoryError> {
        self.head.clone()
    }
}
