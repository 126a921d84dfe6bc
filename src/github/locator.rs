//! Identity wrappers addressing a pull request on GitHub.

use url::Url;

use super::error::GitHubError;

/// Public GitHub API base used when no override is configured.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Repository owner wrapper to avoid stringly typed parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryOwner(String);

impl RepositoryOwner {
    /// Borrow the owner value.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Repository name wrapper to prevent parameter mix-ups.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryName(String);

impl RepositoryName {
    /// Borrow the repository name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Pull request number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PullRequestNumber(u64);

impl PullRequestNumber {
    /// Validates that the number is positive.
    ///
    /// # Errors
    ///
    /// Returns [`GitHubError::InvalidPullRequestNumber`] for zero.
    pub const fn new(value: u64) -> Result<Self, GitHubError> {
        if value == 0 {
            return Err(GitHubError::InvalidPullRequestNumber);
        }
        Ok(Self(value))
    }

    /// Returns the numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Personal access token wrapper enforcing presence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersonalAccessToken(String);

impl PersonalAccessToken {
    /// Validates that the token is non-empty and trims whitespace.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::MissingToken` when the supplied string is blank.
    pub fn new(token: impl AsRef<str>) -> Result<Self, GitHubError> {
        let trimmed = token.as_ref().trim();
        if trimmed.is_empty() {
            return Err(GitHubError::MissingToken);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the token value.
    #[must_use]
    pub const fn value(&self) -> &str {
        self.0.as_str()
    }
}

impl AsRef<str> for PersonalAccessToken {
    fn as_ref(&self) -> &str {
        self.value()
    }
}

/// Address of a pull request: API base, repository and issue number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestLocator {
    api_base: Url,
    owner: RepositoryOwner,
    repository: RepositoryName,
    number: PullRequestNumber,
}

impl PullRequestLocator {
    /// Builds a locator from an `owner/repo` slug and a pull request number.
    ///
    /// # Errors
    ///
    /// Returns `GitHubError::InvalidUrl` when `api_base` cannot be parsed,
    /// `InvalidRepository` when the slug is not `owner/repo`, and
    /// `InvalidPullRequestNumber` for a zero number.
    ///
    /// # Example
    ///
    /// ```
    /// use lanesync::github::PullRequestLocator;
    ///
    /// let locator = PullRequestLocator::new("https://api.github.com", "octo/repo", 7)
    ///     .expect("locator should build");
    /// assert_eq!(locator.owner().as_str(), "octo");
    /// assert_eq!(locator.number().get(), 7);
    /// ```
    pub fn new(api_base: &str, slug: &str, number: u64) -> Result<Self, GitHubError> {
        let api_base =
            Url::parse(api_base).map_err(|error| GitHubError::InvalidUrl(error.to_string()))?;
        if api_base.cannot_be_a_base() {
            return Err(GitHubError::InvalidUrl(format!(
                "{api_base} cannot be used as an API base"
            )));
        }
        let (owner, repository) = split_slug(slug)?;
        let number = PullRequestNumber::new(number)?;

        Ok(Self {
            api_base,
            owner,
            repository,
            number,
        })
    }

    /// API base URL.
    #[must_use]
    pub const fn api_base(&self) -> &Url {
        &self.api_base
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &RepositoryOwner {
        &self.owner
    }

    /// Repository name.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryName {
        &self.repository
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> PullRequestNumber {
        self.number
    }

    fn repo_path(&self) -> String {
        format!(
            "/repos/{}/{}",
            self.owner.as_str(),
            self.repository.as_str()
        )
    }

    pub(crate) fn comments_path(&self) -> String {
        format!("{}/issues/{}/comments", self.repo_path(), self.number.get())
    }

    pub(crate) fn comment_path(&self, comment_id: u64) -> String {
        format!("{}/issues/comments/{comment_id}", self.repo_path())
    }

    pub(crate) fn issue_labels_path(&self) -> String {
        format!("{}/issues/{}/labels", self.repo_path(), self.number.get())
    }

    /// Path of one attached label. The name is percent-encoded as a single
    /// segment, so `/` and spaces cannot escape it.
    pub(crate) fn issue_label_path(&self, name: &str) -> String {
        let number = self.number.get().to_string();
        let mut url = self.api_base.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.clear().extend([
                "repos",
                self.owner.as_str(),
                self.repository.as_str(),
                "issues",
                number.as_str(),
                "labels",
                name,
            ]);
        }
        url.path().to_owned()
    }

    pub(crate) fn repository_labels_path(&self) -> String {
        format!("{}/labels", self.repo_path())
    }
}

fn split_slug(slug: &str) -> Result<(RepositoryOwner, RepositoryName), GitHubError> {
    let invalid = || GitHubError::InvalidRepository {
        value: slug.to_owned(),
    };
    let (owner, name) = slug.trim().split_once('/').ok_or_else(invalid)?;
    if owner.is_empty() || name.is_empty() || name.contains('/') {
        return Err(invalid());
    }
    Ok((
        RepositoryOwner(owner.to_owned()),
        RepositoryName(name.to_owned()),
    ))
}
