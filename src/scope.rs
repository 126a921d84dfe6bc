//! Registry scope identity and the lane URLs derived from it.

use crate::error::PipelineError;

/// Default registry web host.
pub const DEFAULT_REGISTRY_HOST: &str = "bit.cloud";

/// A registry scope owned by an organisation, addressed as `<org>.<scope>`.
///
/// # Example
///
/// ```
/// use lanesync::scope::ScopeRef;
///
/// let scope = ScopeRef::new("acme", "design").expect("scope should be valid");
/// assert_eq!(scope.qualified(), "acme.design");
/// assert_eq!(
///     scope.lane_url("bit.cloud", "pr-7"),
///     "https://bit.cloud/acme/design/~lane/pr-7"
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeRef {
    org: String,
    scope: String,
}

impl ScopeRef {
    /// Validates and wraps an organisation and scope name.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when either part is blank or
    /// contains `/` or whitespace.
    pub fn new(org: &str, scope: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            org: validate_part("organisation", org)?,
            scope: validate_part("scope", scope)?,
        })
    }

    /// Organisation name.
    #[must_use]
    pub const fn org(&self) -> &str {
        self.org.as_str()
    }

    /// Scope name within the organisation.
    #[must_use]
    pub const fn scope(&self) -> &str {
        self.scope.as_str()
    }

    /// Registry-wide scope id, `<org>.<scope>`.
    #[must_use]
    pub fn qualified(&self) -> String {
        format!("{}.{}", self.org, self.scope)
    }

    /// Remote lane id, `<org>.<scope>/<lane>`.
    #[must_use]
    pub fn qualified_lane(&self, lane: &str) -> String {
        format!("{}/{lane}", self.qualified())
    }

    /// URL prefix shared by every lane of this scope. Used as the status
    /// comment marker.
    #[must_use]
    pub fn lane_url_prefix(&self, host: &str) -> String {
        format!("https://{host}/{}/{}/~lane/", self.org, self.scope)
    }

    /// Browsable URL of one lane.
    #[must_use]
    pub fn lane_url(&self, host: &str, lane: &str) -> String {
        format!("{}{lane}", self.lane_url_prefix(host))
    }
}

impl std::fmt::Display for ScopeRef {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}.{}", self.org, self.scope)
    }
}

fn validate_part(kind: &str, value: &str) -> Result<String, PipelineError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed.contains('/') || trimmed.contains(char::is_whitespace) {
        return Err(PipelineError::Configuration {
            message: format!("{kind} name is invalid: {value:?}"),
        });
    }
    Ok(trimmed.to_owned())
}
