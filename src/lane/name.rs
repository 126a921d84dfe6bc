//! Deterministic lane naming.

use regex::Regex;

use crate::error::PipelineError;

/// Branches matching this pattern already carry a lane name.
pub const DEFAULT_LANE_BRANCH_PATTERN: &str = "^pr-[0-9]+$";

/// Name of the ephemeral lane a pull request publishes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneName(String);

impl LaneName {
    /// Validates a lane name: non-blank, without whitespace or `/`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] for invalid names.
    pub fn new(value: &str) -> Result<Self, PipelineError> {
        if value.is_empty() || value.contains('/') || value.contains(char::is_whitespace) {
            return Err(PipelineError::Configuration {
                message: format!("lane name is invalid: {value:?}"),
            });
        }
        Ok(Self(value.to_owned()))
    }

    /// Derives the lane for pull request `number`.
    ///
    /// A source branch matching `reserved` is used verbatim, since the
    /// contributor already pushed to a named lane; otherwise the name is
    /// `pr-<number>`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] if the resulting name is
    /// invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use lanesync::lane::LaneName;
    /// use regex::Regex;
    ///
    /// let reserved = Regex::new("^pr-[0-9]+$").expect("valid pattern");
    /// let derived = LaneName::derive(12, Some("feature/login"), &reserved).expect("valid name");
    /// assert_eq!(derived.as_str(), "pr-12");
    /// let verbatim = LaneName::derive(12, Some("pr-9"), &reserved).expect("valid name");
    /// assert_eq!(verbatim.as_str(), "pr-9");
    /// ```
    pub fn derive(
        number: u64,
        branch: Option<&str>,
        reserved: &Regex,
    ) -> Result<Self, PipelineError> {
        match branch.map(str::trim) {
            Some(name) if !name.is_empty() && reserved.is_match(name) => Self::new(name),
            _ => Self::new(&format!("pr-{number}")),
        }
    }

    /// Borrow the lane name.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl std::fmt::Display for LaneName {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter.write_str(&self.0)
    }
}
