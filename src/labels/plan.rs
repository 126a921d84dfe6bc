//! Pure diff between desired version labels and the remote label state.

use std::collections::HashSet;

use super::{VersionLabel, base_of, is_version_label};
use crate::github::Label;

/// Label operations needed to reach the desired state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelPlan {
    /// Labels to detach from the pull request.
    pub to_remove: Vec<String>,
    /// Labels to create in the repository catalog.
    pub to_create: Vec<VersionLabel>,
    /// Label names to attach in one batch.
    pub to_attach: Vec<String>,
}

impl LabelPlan {
    /// Returns true when nothing needs to change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_create.is_empty() && self.to_attach.is_empty()
    }
}

/// Computes the operations turning `attached` into `desired`.
///
/// Without `clear_all`, only version labels whose base name no desired label
/// shares are removed, and only labels missing from `catalog` are created.
/// With `clear_all`, every attached version label is removed and every
/// desired label is (re)created, since the catalog may be stale.
///
/// Desired labels that truncate to the same name collapse to one entry; the
/// last one wins.
///
/// ```
/// use lanesync::github::Label;
/// use lanesync::labels::{Bump, LabelPalette, VersionLabel, plan_labels};
/// use lanesync::status::ComponentId;
///
/// let id = ComponentId::new("acme.design/widget").expect("valid id");
/// let desired = [VersionLabel::for_component(&id, Bump::Patch, &LabelPalette::default())];
/// let attached = [Label::named("button@minor"), Label::named("bug")];
///
/// let plan = plan_labels(&desired, &attached, &[], false);
/// assert_eq!(plan.to_remove, vec!["button@minor".to_owned()]);
/// assert_eq!(plan.to_attach, vec!["widget@patch".to_owned()]);
/// ```
#[must_use]
pub fn plan_labels(
    desired: &[VersionLabel],
    attached: &[Label],
    catalog: &[Label],
    clear_all: bool,
) -> LabelPlan {
    let unique = deduplicate(desired);
    let desired_bases: HashSet<&str> = unique.iter().map(|label| label.base_name()).collect();

    let to_remove: Vec<String> = attached
        .iter()
        .map(|label| label.name.as_str())
        .filter(|name| is_version_label(name))
        .filter(|name| clear_all || !desired_bases.contains(base_of(name)))
        .map(str::to_owned)
        .collect();

    let catalog_names: HashSet<&str> = catalog.iter().map(|label| label.name.as_str()).collect();
    let to_create: Vec<VersionLabel> = unique
        .iter()
        .filter(|label| clear_all || !catalog_names.contains(label.name()))
        .map(|&label| label.clone())
        .collect();

    let still_attached: HashSet<&str> = attached
        .iter()
        .map(|label| label.name.as_str())
        .filter(|name| !to_remove.iter().any(|removed| removed == name))
        .collect();
    let to_attach = unique
        .iter()
        .map(|label| label.name())
        .filter(|name| !still_attached.contains(name))
        .map(str::to_owned)
        .collect();

    LabelPlan {
        to_remove,
        to_create,
        to_attach,
    }
}

fn deduplicate(desired: &[VersionLabel]) -> Vec<&VersionLabel> {
    let mut unique: Vec<&VersionLabel> = Vec::with_capacity(desired.len());
    for label in desired {
        if let Some(slot) = unique.iter_mut().find(|kept| kept.name() == label.name()) {
            *slot = label;
        } else {
            unique.push(label);
        }
    }
    unique
}
