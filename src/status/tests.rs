//! Tests for status parsing and inspection.

use rstest::rstest;

use super::{ChangeStatus, ComponentId, StatusInspector, parse_status};
use crate::error::PipelineError;
use crate::tool::test_support::ScriptedBuildTool;

fn id(value: &str) -> ComponentId {
    ComponentId::new(value).expect("valid component id")
}

#[rstest]
fn parses_full_report() {
    let report = r#"{
        "newComponents": ["org.scope/widget"],
        "modifiedComponents": [{"id": "org.scope/button"}],
        "stagedComponents": [{"id": "org.scope/card", "versions": ["1.0.1", "1.0.2"]}],
        "componentsWithIssues": []
    }"#;

    let status = parse_status(report).expect("report should parse");

    assert_eq!(status.new_components, vec![id("org.scope/widget")]);
    assert_eq!(status.modified_components, vec![id("org.scope/button")]);
    let staged = status.staged_components.first().expect("one staged entry");
    assert_eq!(staged.id, id("org.scope/card"));
    assert_eq!(staged.versions, vec!["1.0.1".to_owned(), "1.0.2".to_owned()]);
}

#[rstest]
fn missing_sections_default_to_empty() {
    let status = parse_status("{}").expect("empty object should parse");
    assert_eq!(status, ChangeStatus::default());
    assert!(status.is_unchanged());
}

#[rstest]
#[case::interleaved_logging("loading workspace...\n{\"newComponents\": []}")]
#[case::empty("")]
#[case::array("[]")]
#[case::positional_array(r#"[["acme.design/widget"],[],[]]"#)]
#[case::scalar("42")]
#[case::blank_id(r#"{"newComponents": ["  "]}"#)]
fn rejects_malformed_reports(#[case] report: &str) {
    let result = parse_status(report);
    assert!(
        matches!(result, Err(PipelineError::StatusParse { .. })),
        "expected StatusParse, got {result:?}"
    );
}

#[rstest]
#[case::simple("org.scope/widget", "widget")]
#[case::nested("org.scope/ui/forms/input", "input")]
#[case::versioned("org.scope/widget@2.1.0", "widget")]
#[case::bare("widget", "widget")]
fn derives_base_names(#[case] raw: &str, #[case] expected: &str) {
    assert_eq!(id(raw).base_name(), expected);
}

#[rstest]
fn changed_components_are_deduplicated_in_order() {
    let status = ChangeStatus {
        new_components: vec![id("org.scope/a"), id("org.scope/b")],
        modified_components: vec![id("org.scope/b"), id("org.scope/c")],
        staged_components: Vec::new(),
    };

    let changed: Vec<&str> = status
        .changed_components()
        .into_iter()
        .map(ComponentId::as_str)
        .collect();
    assert_eq!(changed, vec!["org.scope/a", "org.scope/b", "org.scope/c"]);
}

#[rstest]
#[tokio::test]
async fn inspector_captures_a_dedicated_strict_status_call() {
    let tool = ScriptedBuildTool::new().on_success(
        &["status", "--json"],
        r#"{"newComponents":["org.scope/widget"]}"#,
    );

    let status = StatusInspector::new(&tool)
        .obtain()
        .await
        .expect("status should be obtained");

    assert_eq!(status.new_components, vec![id("org.scope/widget")]);
    assert_eq!(
        tool.invocations(),
        vec![vec![
            "status".to_owned(),
            "--json".to_owned(),
            "--strict".to_owned()
        ]]
    );
}

#[rstest]
#[tokio::test]
async fn inspector_reports_tool_failures_separately_from_parse_failures() {
    let tool = ScriptedBuildTool::new().on_failure(&["status"], "workspace not found");

    let error = StatusInspector::new(&tool)
        .obtain()
        .await
        .expect_err("status should fail");

    assert!(
        matches!(error, PipelineError::Tool { .. }),
        "unexpected error: {error:?}"
    );
}
