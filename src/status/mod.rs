//! Change-status report of the workspace.
//!
//! The build tool reports which components are new, modified or staged as a
//! JSON document. [`StatusInspector`] captures that document from a dedicated
//! non-interactive invocation and [`parse_status`] turns it into a
//! [`ChangeStatus`], read-only for the rest of the run.

use serde::Deserialize;
use serde_json::Value;

use crate::error::PipelineError;
use crate::tool::{BuildTool, ToolInvocation};

/// Namespaced component identity, `scope/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(try_from = "RawComponentRef")]
pub struct ComponentId(String);

impl ComponentId {
    /// Wraps a component id, rejecting blank values.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::StatusParse`] for a blank id.
    pub fn new(value: impl Into<String>) -> Result<Self, PipelineError> {
        let value = value.into();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(PipelineError::StatusParse {
                message: "component id must not be blank".to_owned(),
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Full id.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Short name: the final path segment of the id, without any version.
    ///
    /// # Example
    ///
    /// ```
    /// use lanesync::status::ComponentId;
    ///
    /// let id = ComponentId::new("org.scope/ui/widget@1.0.0").expect("valid id");
    /// assert_eq!(id.base_name(), "widget");
    /// ```
    #[must_use]
    pub fn base_name(&self) -> &str {
        let unversioned = self.0.split_once('@').map_or(self.0.as_str(), |(id, _)| id);
        unversioned
            .rsplit_once('/')
            .map_or(unversioned, |(_, name)| name)
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}

/// Component references appear either as bare ids or as objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawComponentRef {
    Id(String),
    Object { id: String },
}

impl TryFrom<RawComponentRef> for ComponentId {
    type Error = String;

    fn try_from(value: RawComponentRef) -> Result<Self, Self::Error> {
        let (RawComponentRef::Id(id) | RawComponentRef::Object { id }) = value;
        Self::new(id).map_err(|error| error.to_string())
    }
}

/// A component with snaps or tags that have not been exported yet.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StagedComponent {
    /// Component identity.
    pub id: ComponentId,
    /// Staged versions, semantic versions or snap hashes.
    #[serde(default)]
    pub versions: Vec<String>,
}

/// Parsed change-status report.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ChangeStatus {
    /// Components not yet known to the remote.
    pub new_components: Vec<ComponentId>,
    /// Components changed since their last version.
    pub modified_components: Vec<ComponentId>,
    /// Components with local versions awaiting export.
    pub staged_components: Vec<StagedComponent>,
}

impl ChangeStatus {
    /// Returns true when there is nothing new or modified to publish.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        self.new_components.is_empty() && self.modified_components.is_empty()
    }

    /// New then modified components, each id once, in report order.
    #[must_use]
    pub fn changed_components(&self) -> Vec<&ComponentId> {
        let mut changed: Vec<&ComponentId> = Vec::new();
        for id in self.new_components.iter().chain(&self.modified_components) {
            if !changed.contains(&id) {
                changed.push(id);
            }
        }
        changed
    }
}

/// Parses the tool's JSON status report.
///
/// # Errors
///
/// Returns [`PipelineError::StatusParse`] when `report` is not a JSON object
/// of the expected shape.
///
/// # Example
///
/// ```
/// use lanesync::status::parse_status;
///
/// let status = parse_status(r#"{"newComponents":["org.scope/widget"]}"#)
///     .expect("report should parse");
/// assert!(!status.is_unchanged());
/// ```
pub fn parse_status(report: &str) -> Result<ChangeStatus, PipelineError> {
    let parse_error = |error: serde_json::Error| PipelineError::StatusParse {
        message: error.to_string(),
    };
    let value: Value = serde_json::from_str(report.trim()).map_err(parse_error)?;
    if !value.is_object() {
        return Err(PipelineError::StatusParse {
            message: "status report must be a JSON object".to_owned(),
        });
    }
    serde_json::from_value(value).map_err(parse_error)
}

/// Obtains the change status from the build tool.
pub struct StatusInspector<'tool, Tool>
where
    Tool: BuildTool + ?Sized,
{
    tool: &'tool Tool,
}

impl<'tool, Tool> StatusInspector<'tool, Tool>
where
    Tool: BuildTool + ?Sized,
{
    /// Creates an inspector using `tool`.
    #[must_use]
    pub const fn new(tool: &'tool Tool) -> Self {
        Self { tool }
    }

    /// Runs the status command and parses its report.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Tool`] when the command fails and
    /// [`PipelineError::StatusParse`] when its output is not a valid report.
    pub async fn obtain(&self) -> Result<ChangeStatus, PipelineError> {
        let invocation = ToolInvocation::new(["status", "--json", "--strict"]).captured();
        let output = self
            .tool
            .run(&invocation)
            .await
            .map_err(|error| PipelineError::Tool {
                operation: "status".to_owned(),
                message: error.to_string(),
            })?;

        let status = parse_status(&output.stdout)?;
        tracing::info!(
            new = status.new_components.len(),
            modified = status.modified_components.len(),
            staged = status.staged_components.len(),
            "component status obtained"
        );
        Ok(status)
    }
}

#[cfg(test)]
mod tests;
