//! Version-marker labels and their reconciliation against a pull request.
//!
//! Every new or modified component gets a `<base>@<bump>` label. Names are
//! capped at GitHub's 50-character ceiling by keeping their tail, so the bump
//! suffix always survives truncation.

mod backoff;
mod plan;
mod reconciler;

pub use backoff::{BackoffPolicy, DEFAULT_RETRY_DELAY, FixedDelay};
pub use plan::{LabelPlan, plan_labels};
pub use reconciler::{LabelReconciler, ReconcileReport};

#[cfg(any(test, feature = "test-support"))]
pub use backoff::NoDelay;

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::error::PipelineError;
use crate::github::Label;
use crate::status::ComponentId;

/// Longest label name GitHub accepts, in characters.
pub const MAX_LABEL_NAME_CHARS: usize = 50;

/// Longest label description GitHub accepts, in characters.
pub const MAX_LABEL_DESCRIPTION_CHARS: usize = 100;

/// Semantic-version change class signalled by a label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bump {
    /// Breaking change.
    Major,
    /// Backwards-compatible feature.
    Minor,
    /// Backwards-compatible fix.
    Patch,
}

impl Bump {
    /// Every bump, from most to least significant.
    pub const ALL: [Self; 3] = [Self::Major, Self::Minor, Self::Patch];

    /// Lower-case name used in label suffixes.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Major => "major",
            Self::Minor => "minor",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for Bump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bump name that is not `major`, `minor` or `patch`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown version bump `{value}`; expected major, minor or patch")]
pub struct ParseBumpError {
    value: String,
}

impl FromStr for Bump {
    type Err = ParseBumpError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        Self::ALL
            .into_iter()
            .find(|bump| bump.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| ParseBumpError {
                value: value.to_owned(),
            })
    }
}

/// Label colours per bump, as six hex digits without `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelPalette {
    major: String,
    minor: String,
    patch: String,
}

impl LabelPalette {
    /// Default colour for major bumps.
    pub const DEFAULT_MAJOR: &'static str = "f85149";
    /// Default colour for minor bumps.
    pub const DEFAULT_MINOR: &'static str = "fbca04";
    /// Default colour for patch bumps.
    pub const DEFAULT_PATCH: &'static str = "0e8a16";

    /// Builds a palette, accepting colours with or without a leading `#`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Configuration`] when a colour is not six hex
    /// digits.
    pub fn new(major: &str, minor: &str, patch: &str) -> Result<Self, PipelineError> {
        Ok(Self {
            major: normalise_colour(major)?,
            minor: normalise_colour(minor)?,
            patch: normalise_colour(patch)?,
        })
    }

    /// Colour of labels for `bump`.
    #[must_use]
    pub fn colour_for(&self, bump: Bump) -> &str {
        match bump {
            Bump::Major => &self.major,
            Bump::Minor => &self.minor,
            Bump::Patch => &self.patch,
        }
    }
}

impl Default for LabelPalette {
    fn default() -> Self {
        Self {
            major: Self::DEFAULT_MAJOR.to_owned(),
            minor: Self::DEFAULT_MINOR.to_owned(),
            patch: Self::DEFAULT_PATCH.to_owned(),
        }
    }
}

fn normalise_colour(value: &str) -> Result<String, PipelineError> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() == 6 && hex.chars().all(|c| c.is_ascii_hexdigit()) {
        Ok(hex.to_ascii_lowercase())
    } else {
        Err(PipelineError::Configuration {
            message: format!("label colour `{value}` must be six hex digits"),
        })
    }
}

/// A label marking the bump a component requires.
///
/// # Example
///
/// ```
/// use lanesync::labels::{Bump, LabelPalette, VersionLabel};
/// use lanesync::status::ComponentId;
///
/// let id = ComponentId::new("acme.design/ui/widget").expect("valid id");
/// let label = VersionLabel::for_component(&id, Bump::Patch, &LabelPalette::default());
/// assert_eq!(label.name(), "widget@patch");
/// assert_eq!(label.base_name(), "widget");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionLabel {
    name: String,
    description: String,
    color: String,
}

impl VersionLabel {
    /// Label for `component` requiring `bump`, coloured from `palette`.
    #[must_use]
    pub fn for_component(component: &ComponentId, bump: Bump, palette: &LabelPalette) -> Self {
        let description = format!("{component} requires a {bump} version bump");
        Self {
            name: version_label_name(component.base_name(), bump),
            description: keep_head(&description, MAX_LABEL_DESCRIPTION_CHARS).to_owned(),
            color: palette.colour_for(bump).to_owned(),
        }
    }

    /// Label name, at most [`MAX_LABEL_NAME_CHARS`] characters.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Catalog description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Hex colour without `#`.
    #[must_use]
    pub fn color(&self) -> &str {
        &self.color
    }

    /// Name without its `@bump` suffix.
    #[must_use]
    pub fn base_name(&self) -> &str {
        base_of(&self.name)
    }

    /// Catalog representation used when creating the label.
    #[must_use]
    pub fn to_label(&self) -> Label {
        Label {
            name: self.name.clone(),
            description: Some(self.description.clone()),
            color: Some(self.color.clone()),
        }
    }
}

/// Builds `<base>@<bump>`, keeping only the last [`MAX_LABEL_NAME_CHARS`]
/// characters when longer.
///
/// ```
/// use lanesync::labels::{Bump, version_label_name};
///
/// let long = "x".repeat(60);
/// let name = version_label_name(&long, Bump::Patch);
/// assert_eq!(name.chars().count(), 50);
/// assert!(name.ends_with("@patch"));
/// ```
#[must_use]
pub fn version_label_name(base: &str, bump: Bump) -> String {
    let full = format!("{base}@{bump}");
    keep_tail(&full, MAX_LABEL_NAME_CHARS).to_owned()
}

/// Returns true when `name` ends in `@major`, `@minor` or `@patch`.
#[must_use]
pub fn is_version_label(name: &str) -> bool {
    name.rsplit_once('@').is_some_and(|(_, suffix)| {
        Bump::ALL.iter().any(|bump| bump.as_str() == suffix)
    })
}

/// Substring before the last `@`, or the whole name when there is none.
#[must_use]
pub fn base_of(name: &str) -> &str {
    name.rsplit_once('@').map_or(name, |(base, _)| base)
}

/// One label per distinct changed component, in first-seen order.
#[must_use]
pub fn desired_labels(
    components: &[&ComponentId],
    bump: Bump,
    palette: &LabelPalette,
) -> Vec<VersionLabel> {
    components
        .iter()
        .map(|component| VersionLabel::for_component(component, bump, palette))
        .collect()
}

fn keep_tail(value: &str, max_chars: usize) -> &str {
    let excess = value.chars().count().saturating_sub(max_chars);
    value
        .char_indices()
        .nth(excess)
        .and_then(|(start, _)| value.get(start..))
        .unwrap_or(value)
}

fn keep_head(value: &str, max_chars: usize) -> &str {
    value
        .char_indices()
        .nth(max_chars)
        .and_then(|(end, _)| value.get(..end))
        .unwrap_or(value)
}
