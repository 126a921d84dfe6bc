//! Explicit run configuration handed to the orchestrator.

use regex::Regex;
use semver::Version;

use crate::comment::DEFAULT_BOT_LOGIN;
use crate::error::PipelineError;
use crate::github::PullRequestLocator;
use crate::labels::{Bump, LabelPalette};
use crate::lane::DEFAULT_LANE_BRANCH_PATTERN;
use crate::scope::{DEFAULT_REGISTRY_HOST, ScopeRef};

/// Oldest build tool release the pipeline drives.
pub const DEFAULT_MIN_TOOL_VERSION: Version = Version::new(1, 0, 0);

/// How version labels are applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabelSettings {
    /// Bump every changed component is labelled with.
    pub bump: Bump,
    /// Label colours.
    pub palette: LabelPalette,
    /// Detach every version label before re-applying the desired set.
    pub clear_all: bool,
}

impl Default for VersionLabelSettings {
    fn default() -> Self {
        Self {
            bump: Bump::Patch,
            palette: LabelPalette::default(),
            clear_all: false,
        }
    }
}

/// Everything one pipeline run needs to know about its environment.
///
/// Built once by the configuration layer; nothing downstream reads process
/// state.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Registry scope receiving the lane.
    pub scope: ScopeRef,
    /// Host serving lane pages, e.g. `bit.cloud`.
    pub registry_host: String,
    /// Oldest accepted build tool version.
    pub min_tool_version: Version,
    /// Pull request being published.
    pub pull_request: PullRequestLocator,
    /// Pull request title, preferred as the snap message.
    pub pr_title: Option<String>,
    /// Source branch of the pull request.
    pub branch: Option<String>,
    /// Branch names that are used verbatim as lane names.
    pub lane_branch_pattern: Regex,
    /// Version label behaviour; `None` disables labelling.
    pub version_labels: Option<VersionLabelSettings>,
    /// Skip the build stage.
    pub skip_build: bool,
    /// Post an informational comment when nothing changed.
    pub comment_when_unchanged: bool,
    /// Login whose comments are candidates for update.
    pub bot_login: String,
}

impl PipelineConfig {
    /// Configuration with default settings for `scope` and `pull_request`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the built-in lane branch
    /// pattern fails to compile.
    pub fn new(scope: ScopeRef, pull_request: PullRequestLocator) -> Result<Self, PipelineError> {
        Ok(Self {
            scope,
            registry_host: DEFAULT_REGISTRY_HOST.to_owned(),
            min_tool_version: DEFAULT_MIN_TOOL_VERSION,
            pull_request,
            pr_title: None,
            branch: None,
            lane_branch_pattern: compile_lane_pattern(DEFAULT_LANE_BRANCH_PATTERN)?,
            version_labels: Some(VersionLabelSettings::default()),
            skip_build: false,
            comment_when_unchanged: false,
            bot_login: DEFAULT_BOT_LOGIN.to_owned(),
        })
    }

    /// URL prefix shared by every lane of the scope; marks status comments.
    #[must_use]
    pub fn lane_url_prefix(&self) -> String {
        self.scope.lane_url_prefix(&self.registry_host)
    }
}

/// Compiles a lane branch pattern.
///
/// # Errors
///
/// Returns [`PipelineError::Configuration`] for an invalid regular
/// expression.
pub fn compile_lane_pattern(pattern: &str) -> Result<Regex, PipelineError> {
    Regex::new(pattern).map_err(|error| PipelineError::Configuration {
        message: format!("invalid lane branch pattern `{pattern}`: {error}"),
    })
}
