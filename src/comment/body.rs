//! Status comment bodies.

use crate::status::ChangeStatus;

/// Prefix of the line linking to the published lane.
pub const LANE_LINK_PREFIX: &str = "Link to lane: ";

/// Body announcing a published lane and the components it carries.
///
/// ```
/// use lanesync::comment::lane_comment_body;
/// use lanesync::status::parse_status;
///
/// let status = parse_status(r#"{"newComponents":["acme.design/widget"]}"#)
///     .expect("report should parse");
/// let body = lane_comment_body("https://bit.cloud/acme/design/~lane/pr-7", &status);
/// assert!(body.starts_with("Link to lane: https://bit.cloud/acme/design/~lane/pr-7"));
/// assert!(body.contains("- acme.design/widget"));
/// ```
#[must_use]
pub fn lane_comment_body(lane_url: &str, status: &ChangeStatus) -> String {
    let staged: Vec<String> = status
        .staged_components
        .iter()
        .flat_map(|staged| {
            staged
                .versions
                .iter()
                .map(move |version| format!("{}@{version}", staged.id))
        })
        .collect();

    let sections = [
        Some(format!("{LANE_LINK_PREFIX}{lane_url}")),
        section(
            "New components",
            status.new_components.iter().map(ToString::to_string),
        ),
        section(
            "Modified components",
            status.modified_components.iter().map(ToString::to_string),
        ),
        section("Staged versions", staged.into_iter()),
    ];
    sections.into_iter().flatten().collect::<Vec<_>>().join("\n\n")
}

/// Body posted when a run finds nothing to publish.
///
/// It carries `lane_url_prefix` so a later publish replaces it.
#[must_use]
pub fn unchanged_comment_body(lane_url_prefix: &str) -> String {
    format!("No new or modified components; nothing was published under {lane_url_prefix}")
}

fn section(heading: &str, entries: impl Iterator<Item = String>) -> Option<String> {
    let lines: Vec<String> = entries.map(|entry| format!("- {entry}")).collect();
    if lines.is_empty() {
        None
    } else {
        Some(format!("{heading}:\n{}", lines.join("\n")))
    }
}
