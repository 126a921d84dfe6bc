//! Pre-flight checks run before any mutation.
//!
//! Both checks are strict: a failure aborts the run before the workspace,
//! the registry or the pull request is touched.

mod registry;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use registry::{
    DEFAULT_GRAPHQL_ENDPOINT, GraphqlRegistryClient, RegistryClient, RegistryError,
};

use semver::Version;

use crate::error::PipelineError;
use crate::scope::ScopeRef;
use crate::tool::{BuildTool, ToolInvocation};

/// Extracts the first semantic version found in `--version` output.
///
/// Tokens may carry a leading `v`; surrounding text is ignored.
///
/// # Example
///
/// ```
/// use lanesync::gate::parse_tool_version;
///
/// let version = parse_tool_version("bit version v1.9.12\n").expect("version present");
/// assert_eq!(version.to_string(), "1.9.12");
/// ```
#[must_use]
pub fn parse_tool_version(output: &str) -> Option<Version> {
    output
        .split(|c: char| c.is_whitespace() || c == ',')
        .map(|token| token.trim_start_matches(['v', 'V']))
        .find_map(|token| Version::parse(token).ok())
}

/// Verifies the build tool version and registry scope access.
pub struct VersionGate<'deps, Tool, Registry>
where
    Tool: BuildTool + ?Sized,
    Registry: RegistryClient + ?Sized,
{
    tool: &'deps Tool,
    registry: &'deps Registry,
}

impl<'deps, Tool, Registry> VersionGate<'deps, Tool, Registry>
where
    Tool: BuildTool + ?Sized,
    Registry: RegistryClient + ?Sized,
{
    /// Creates a gate over the given collaborators.
    #[must_use]
    pub const fn new(tool: &'deps Tool, registry: &'deps Registry) -> Self {
        Self { tool, registry }
    }

    /// Fails unless the installed tool is at least `minimum`.
    ///
    /// Versions are compared semantically, so `1.10.0` satisfies `1.9.0`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::UnsupportedToolVersion`] when the tool is
    /// older than `minimum` or prints no recognisable version, and
    /// [`PipelineError::Tool`] when the version command itself fails.
    pub async fn check_tool_version(&self, minimum: &Version) -> Result<Version, PipelineError> {
        let output = self
            .tool
            .run(&ToolInvocation::new(["--version"]).captured())
            .await
            .map_err(|error| PipelineError::Tool {
                operation: "version check".to_owned(),
                message: error.to_string(),
            })?;

        let Some(found) = parse_tool_version(&output.stdout) else {
            return Err(PipelineError::UnsupportedToolVersion {
                found: output.stdout.trim().to_owned(),
                required: minimum.to_string(),
            });
        };

        if &found < minimum {
            return Err(PipelineError::UnsupportedToolVersion {
                found: found.to_string(),
                required: minimum.to_string(),
            });
        }

        tracing::info!(version = %found, "build tool version accepted");
        Ok(found)
    }

    /// Fails unless the registry resolves `scope` for the configured token.
    ///
    /// Not-found, unauthorised and transport failures all collapse into the
    /// same error; the underlying cause is only logged.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ScopeUnavailable`] when no scope id comes back.
    pub async fn check_scope_access(&self, scope: &ScopeRef) -> Result<(), PipelineError> {
        let unavailable = || PipelineError::ScopeUnavailable {
            scope: scope.qualified(),
        };

        match self.registry.scope_id(scope).await {
            Ok(Some(id)) if !id.trim().is_empty() => {
                tracing::info!(scope = %scope, "registry scope resolved");
                Ok(())
            }
            Ok(_) => {
                tracing::debug!(scope = %scope, "registry returned no scope id");
                Err(unavailable())
            }
            Err(error) => {
                tracing::debug!(scope = %scope, "scope query failed: {error}");
                Err(unavailable())
            }
        }
    }
}
