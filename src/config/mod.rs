//! Run configuration loaded from CLI, environment, and files.
//!
//! This module provides a unified configuration struct that merges values
//! from command-line arguments, environment variables, and configuration
//! files using ortho-config's layered approach, then validates it into the
//! [`PipelineConfig`] the orchestrator runs with.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.lanesync.toml` in current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `LANESYNC_*`, then the variables GitHub
//!    Actions and the registry CLI conventionally set (`GITHUB_TOKEN`,
//!    `GITHUB_REPOSITORY`, `GITHUB_REF`, `GITHUB_HEAD_REF`, `GITHUB_API_URL`,
//!    `BIT_CLOUD_ACCESS_TOKEN`, `WSDIR`, `ORG`, `SCOPE`)
//! 4. **Command-line arguments** – `--org`, `--scope`, `--pr-number`, ...
//!
//! # Configuration File
//!
//! ```toml
//! org = "acme"
//! scope = "design"
//! ws_dir = "packages"
//! version_bump = "minor"
//! skip_build = true
//! ```

use std::env;
use std::time::Duration;

use camino::Utf8PathBuf;
use ortho_config::OrthoConfig;
use semver::Version;
use serde::{Deserialize, Serialize};

use crate::comment::DEFAULT_BOT_LOGIN;
use crate::error::PipelineError;
use crate::gate::DEFAULT_GRAPHQL_ENDPOINT;
use crate::github::{DEFAULT_API_BASE, PullRequestLocator};
use crate::labels::{Bump, DEFAULT_RETRY_DELAY, LabelPalette};
use crate::lane::DEFAULT_LANE_BRANCH_PATTERN;
use crate::pipeline::{
    DEFAULT_MIN_TOOL_VERSION, PipelineConfig, VersionLabelSettings, compile_lane_pattern,
};
use crate::scope::{DEFAULT_REGISTRY_HOST, ScopeRef};

/// Default build tool executable.
pub const DEFAULT_BIT_BIN: &str = "bit";

/// Run configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use lanesync::LanesyncConfig;
/// use ortho_config::OrthoConfig;
///
/// let config = LanesyncConfig::load().expect("failed to load configuration");
/// let pipeline = config.pipeline_config().expect("incomplete configuration");
/// println!("publishing to {}", pipeline.scope);
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "LANESYNC",
    discovery(
        dotfile_name = ".lanesync.toml",
        config_file_name = "lanesync.toml",
        app_name = "lanesync"
    )
)]
pub struct LanesyncConfig {
    /// Workspace directory the build tool runs in.
    ///
    /// Falls back to `WSDIR`, then the current directory.
    #[ortho_config(cli_short = 'w')]
    pub ws_dir: Option<String>,

    /// Registry organisation. Falls back to `ORG`.
    #[ortho_config(cli_short = 'o')]
    pub org: Option<String>,

    /// Registry scope within the organisation. Falls back to `SCOPE`.
    #[ortho_config(cli_short = 's')]
    pub scope: Option<String>,

    /// Registry access token. Falls back to `BIT_CLOUD_ACCESS_TOKEN`.
    #[ortho_config()]
    pub bit_token: Option<String>,

    /// GitHub token. Falls back to `GITHUB_TOKEN`.
    #[ortho_config(cli_short = 't')]
    pub github_token: Option<String>,

    /// Repository as `owner/repo`. Falls back to `GITHUB_REPOSITORY`.
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Pull request number. Falls back to parsing `GITHUB_REF`
    /// (`refs/pull/<n>/merge`).
    #[ortho_config(cli_short = 'p')]
    pub pr_number: Option<u64>,

    /// Pull request title, used as the snap message.
    #[ortho_config()]
    pub pr_title: Option<String>,

    /// Pull request source branch. Falls back to `GITHUB_HEAD_REF`.
    #[ortho_config(cli_short = 'H')]
    pub branch: Option<String>,

    /// GitHub REST API base. Falls back to `GITHUB_API_URL`.
    #[ortho_config()]
    pub github_api_url: Option<String>,

    /// Host serving lane pages.
    #[ortho_config()]
    pub registry_host: Option<String>,

    /// Registry GraphQL endpoint used for the scope check.
    #[ortho_config()]
    pub graphql_endpoint: Option<String>,

    /// Build tool executable.
    #[ortho_config()]
    pub bit_bin: String,

    /// Oldest accepted build tool version, e.g. `1.6.0`.
    #[ortho_config()]
    pub min_bit_version: Option<String>,

    /// Bump recorded on version labels: `major`, `minor` or `patch`.
    #[ortho_config()]
    pub version_bump: String,

    /// Detach every version label before re-applying the current set.
    ///
    /// Note: `ortho_config` does not load boolean values from the
    /// environment; use the CLI flag or the configuration file.
    #[ortho_config()]
    pub clear_labels: bool,

    /// Disables version labelling.
    #[ortho_config()]
    pub no_version_labels: bool,

    /// Skips the build stage.
    #[ortho_config()]
    pub skip_build: bool,

    /// Posts an informational comment when nothing changed.
    #[ortho_config()]
    pub comment_when_unchanged: bool,

    /// Colour of `@major` labels.
    #[ortho_config()]
    pub major_color: String,

    /// Colour of `@minor` labels.
    #[ortho_config()]
    pub minor_color: String,

    /// Colour of `@patch` labels.
    #[ortho_config()]
    pub patch_color: String,

    /// Pause before retrying a rate-limited label creation, in milliseconds.
    #[ortho_config()]
    pub label_retry_delay_ms: u64,

    /// Login the status comment is posted as.
    #[ortho_config()]
    pub bot_login: String,

    /// Branches matching this pattern are used verbatim as lane names.
    #[ortho_config()]
    pub lane_branch_pattern: String,

    /// Writes stage telemetry to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for LanesyncConfig {
    fn default() -> Self {
        Self {
            ws_dir: None,
            org: None,
            scope: None,
            bit_token: None,
            github_token: None,
            repository: None,
            pr_number: None,
            pr_title: None,
            branch: None,
            github_api_url: None,
            registry_host: None,
            graphql_endpoint: None,
            bit_bin: DEFAULT_BIT_BIN.to_owned(),
            min_bit_version: None,
            version_bump: Bump::Patch.as_str().to_owned(),
            clear_labels: false,
            no_version_labels: false,
            skip_build: false,
            comment_when_unchanged: false,
            major_color: LabelPalette::DEFAULT_MAJOR.to_owned(),
            minor_color: LabelPalette::DEFAULT_MINOR.to_owned(),
            patch_color: LabelPalette::DEFAULT_PATCH.to_owned(),
            label_retry_delay_ms: u64::try_from(DEFAULT_RETRY_DELAY.as_millis())
                .unwrap_or(u64::MAX),
            bot_login: DEFAULT_BOT_LOGIN.to_owned(),
            lane_branch_pattern: DEFAULT_LANE_BRANCH_PATTERN.to_owned(),
            telemetry: false,
        }
    }
}

/// Returns the configured value, else the non-blank environment variable.
fn or_env(value: Option<&String>, var: &str) -> Option<String> {
    value
        .cloned()
        .or_else(|| env::var(var).ok())
        .map(|found| found.trim().to_owned())
        .filter(|found| !found.is_empty())
}

fn missing(what: &str, hint: &str) -> PipelineError {
    PipelineError::Configuration {
        message: format!("{what} is required ({hint})"),
    }
}

/// Extracts `<n>` from `refs/pull/<n>/merge` or `refs/pull/<n>/head`.
fn pull_number_from_ref(git_ref: &str) -> Option<u64> {
    git_ref
        .strip_prefix("refs/pull/")
        .and_then(|rest| rest.split('/').next())
        .and_then(|number| number.parse().ok())
}

impl LanesyncConfig {
    /// Workspace directory, defaulting to `.`.
    #[must_use]
    pub fn resolve_ws_dir(&self) -> Utf8PathBuf {
        or_env(self.ws_dir.as_ref(), "WSDIR")
            .map_or_else(|| Utf8PathBuf::from("."), Utf8PathBuf::from)
    }

    /// Registry organisation.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when unset.
    pub fn resolve_org(&self) -> Result<String, PipelineError> {
        or_env(self.org.as_ref(), "ORG").ok_or_else(|| missing("organisation", "--org or ORG"))
    }

    /// Registry scope name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when unset.
    pub fn resolve_scope(&self) -> Result<String, PipelineError> {
        or_env(self.scope.as_ref(), "SCOPE").ok_or_else(|| missing("scope", "--scope or SCOPE"))
    }

    /// Registry access token.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when unset.
    pub fn resolve_bit_token(&self) -> Result<String, PipelineError> {
        or_env(self.bit_token.as_ref(), "BIT_CLOUD_ACCESS_TOKEN")
            .ok_or_else(|| missing("registry token", "--bit-token or BIT_CLOUD_ACCESS_TOKEN"))
    }

    /// GitHub token.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when unset.
    pub fn resolve_github_token(&self) -> Result<String, PipelineError> {
        or_env(self.github_token.as_ref(), "GITHUB_TOKEN")
            .ok_or_else(|| missing("GitHub token", "--github-token or GITHUB_TOKEN"))
    }

    /// Repository slug `owner/repo`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when unset.
    pub fn resolve_repository(&self) -> Result<String, PipelineError> {
        or_env(self.repository.as_ref(), "GITHUB_REPOSITORY")
            .ok_or_else(|| missing("repository", "--repository or GITHUB_REPOSITORY"))
    }

    /// Pull request number.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when neither the setting nor
    /// a pull request `GITHUB_REF` provides one.
    pub fn resolve_pr_number(&self) -> Result<u64, PipelineError> {
        self.pr_number
            .or_else(|| {
                env::var("GITHUB_REF")
                    .ok()
                    .as_deref()
                    .and_then(pull_number_from_ref)
            })
            .ok_or_else(|| missing("pull request number", "--pr-number or GITHUB_REF"))
    }

    /// Pull request source branch, if known.
    #[must_use]
    pub fn resolve_branch(&self) -> Option<String> {
        or_env(self.branch.as_ref(), "GITHUB_HEAD_REF")
    }

    /// GitHub REST API base.
    #[must_use]
    pub fn resolve_github_api_url(&self) -> String {
        or_env(self.github_api_url.as_ref(), "GITHUB_API_URL")
            .unwrap_or_else(|| DEFAULT_API_BASE.to_owned())
    }

    /// Registry GraphQL endpoint.
    #[must_use]
    pub fn resolve_graphql_endpoint(&self) -> &str {
        self.graphql_endpoint
            .as_deref()
            .unwrap_or(DEFAULT_GRAPHQL_ENDPOINT)
    }

    /// Pause before retrying a rate-limited label creation.
    #[must_use]
    pub const fn label_retry_delay(&self) -> Duration {
        Duration::from_millis(self.label_retry_delay_ms)
    }

    fn min_tool_version(&self) -> Result<Version, PipelineError> {
        let Some(raw) = self.min_bit_version.as_deref() else {
            return Ok(DEFAULT_MIN_TOOL_VERSION);
        };
        Version::parse(raw.trim().trim_start_matches('v')).map_err(|error| {
            PipelineError::Configuration {
                message: format!("invalid minimum tool version `{raw}`: {error}"),
            }
        })
    }

    fn version_labels(&self) -> Result<Option<VersionLabelSettings>, PipelineError> {
        if self.no_version_labels {
            return Ok(None);
        }
        let bump = self
            .version_bump
            .parse::<Bump>()
            .map_err(|error| PipelineError::Configuration {
                message: error.to_string(),
            })?;
        let palette = LabelPalette::new(&self.major_color, &self.minor_color, &self.patch_color)?;
        Ok(Some(VersionLabelSettings {
            bump,
            palette,
            clear_all: self.clear_labels,
        }))
    }

    /// Validates the configuration into the value object a run needs.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] naming the first missing or
    /// malformed setting.
    pub fn pipeline_config(&self) -> Result<PipelineConfig, PipelineError> {
        let scope = ScopeRef::new(&self.resolve_org()?, &self.resolve_scope()?)?;
        let pull_request = PullRequestLocator::new(
            &self.resolve_github_api_url(),
            &self.resolve_repository()?,
            self.resolve_pr_number()?,
        )
        .map_err(|error| PipelineError::Configuration {
            message: error.to_string(),
        })?;

        let mut config = PipelineConfig::new(scope, pull_request)?;
        config.registry_host = self
            .registry_host
            .clone()
            .unwrap_or_else(|| DEFAULT_REGISTRY_HOST.to_owned());
        config.min_tool_version = self.min_tool_version()?;
        config.pr_title = self
            .pr_title
            .clone()
            .filter(|title| !title.trim().is_empty());
        config.branch = self.resolve_branch();
        config.lane_branch_pattern = compile_lane_pattern(&self.lane_branch_pattern)?;
        config.version_labels = self.version_labels()?;
        config.skip_build = self.skip_build;
        config.comment_when_unchanged = self.comment_when_unchanged;
        config.bot_login.clone_from(&self.bot_login);
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
