//! Tests for lane naming, snap messages and the lifecycle state machine.

use regex::Regex;
use rstest::{fixture, rstest};

use super::{LaneError, LaneLifecycle, LaneName, LaneState, LaneStep, SnapMessage};
use crate::error::PipelineError;
use crate::scope::ScopeRef;
use crate::tool::test_support::ScriptedBuildTool;

#[fixture]
fn reserved() -> Regex {
    Regex::new(super::DEFAULT_LANE_BRANCH_PATTERN).expect("default pattern should compile")
}

fn scope() -> ScopeRef {
    ScopeRef::new("acme", "design").expect("valid scope")
}

fn lane(name: &str) -> LaneName {
    LaneName::new(name).expect("valid lane name")
}

fn args(values: &[&str]) -> Vec<String> {
    values.iter().map(|&value| value.to_owned()).collect()
}

#[rstest]
#[case::no_branch(None, "pr-12")]
#[case::ordinary_branch(Some("feature/login"), "pr-12")]
#[case::reserved_branch(Some("pr-4"), "pr-4")]
#[case::reserved_prefix_only(Some("pr-4-hotfix"), "pr-12")]
#[case::blank_branch(Some("  "), "pr-12")]
fn derives_lane_names(
    reserved: Regex,
    #[case] branch: Option<&str>,
    #[case] expected: &str,
) {
    let name = LaneName::derive(12, branch, &reserved).expect("name should derive");
    assert_eq!(name.as_str(), expected);
}

#[rstest]
#[case::empty("")]
#[case::slash("a/b")]
#[case::space("pr 1")]
fn rejects_invalid_lane_names(#[case] value: &str) {
    assert!(matches!(
        LaneName::new(value),
        Err(PipelineError::Configuration { .. })
    ));
}

#[rstest]
#[case::title_wins(Some("Add widget"), Some("commit"), "Add widget")]
#[case::commit_summary(None, Some("  fix: padding  "), "fix: padding")]
#[case::blank_title(Some(" "), Some("chore"), "chore")]
#[case::fallback(None, None, "CI")]
#[case::blank_everything(Some(""), Some("  "), "CI")]
fn resolves_snap_messages(
    #[case] title: Option<&str>,
    #[case] commit: Option<&str>,
    #[case] expected: &str,
) {
    assert_eq!(SnapMessage::resolve(title, commit).as_str(), expected);
}

#[rstest]
#[tokio::test]
async fn full_lifecycle_cleans_remote_between_snap_and_export() {
    let tool = ScriptedBuildTool::new();
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));

    lifecycle.ensure_lane().await.expect("ensure");
    lifecycle
        .snap(&SnapMessage::resolve(Some("Add widget"), None))
        .await
        .expect("snap");
    lifecycle.remove_remote_lane().await.expect("remove");
    lifecycle.export().await.expect("export");
    let published = lifecycle.finish().expect("finish");

    assert_eq!(published.as_str(), "pr-7");
    assert_eq!(lifecycle.state(), LaneState::Done);
    assert_eq!(
        tool.invocations(),
        vec![
            args(&["lane", "create", "pr-7"]),
            args(&["snap", "--message", "Add widget"]),
            args(&["lane", "remove", "acme.design/pr-7", "--remote", "--silent", "--force"]),
            args(&["export"]),
        ]
    );
}

#[rstest]
#[tokio::test]
async fn ensuring_twice_does_not_fail() {
    let tool = ScriptedBuildTool::new()
        .on_success(&["lane", "create"], "")
        .on_failure(&["lane", "create"], "lane pr-7 already exists");
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));

    lifecycle.ensure_lane().await.expect("first ensure");
    lifecycle.ensure_lane().await.expect("second ensure");

    assert_eq!(lifecycle.state(), LaneState::LaneEnsured);
    assert_eq!(tool.count_of(&["lane", "switch", "pr-7"]), 1);
}

#[rstest]
#[tokio::test]
async fn ensure_reports_create_error_when_switch_also_fails() {
    let tool = ScriptedBuildTool::new()
        .on_failure(&["lane", "create"], "workspace is corrupted")
        .on_failure(&["lane", "switch"], "no such lane");
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));

    let error = lifecycle.ensure_lane().await.expect_err("ensure should fail");

    assert_eq!(error.step(), LaneStep::Create);
    assert!(error.to_string().contains("workspace is corrupted"));
    assert_eq!(lifecycle.state(), LaneState::Idle);
}

#[rstest]
#[tokio::test]
async fn missing_remote_lane_still_reaches_export() {
    let tool = ScriptedBuildTool::new().on_failure(&["lane", "remove"], "lane not found");
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));

    lifecycle.ensure_lane().await.expect("ensure");
    lifecycle
        .snap(&SnapMessage::resolve(None, None))
        .await
        .expect("snap");
    let removal = lifecycle.remove_remote_lane().await;
    assert!(removal.is_err(), "removal should report the failure");
    assert_eq!(lifecycle.state(), LaneState::RemoteCleaned);

    lifecycle.export().await.expect("export should still run");
    assert_eq!(lifecycle.state(), LaneState::Exported);
}

#[rstest]
#[tokio::test]
async fn export_before_remote_cleanup_is_rejected() {
    let tool = ScriptedBuildTool::new();
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));
    lifecycle.ensure_lane().await.expect("ensure");
    lifecycle
        .snap(&SnapMessage::resolve(None, None))
        .await
        .expect("snap");

    let error = lifecycle.export().await.expect_err("export should be rejected");

    assert_eq!(
        error,
        LaneError::OutOfOrder {
            step: LaneStep::Export,
            state: LaneState::Snapped,
        }
    );
    assert_eq!(tool.count_of(&["export"]), 0);
}

#[rstest]
#[tokio::test]
async fn export_failures_convert_to_lane_operation_errors() {
    let tool = ScriptedBuildTool::new().on_failure(&["export"], "permission denied");
    let mut lifecycle = LaneLifecycle::new(&tool, scope(), lane("pr-7"));
    lifecycle.ensure_lane().await.expect("ensure");
    lifecycle
        .snap(&SnapMessage::resolve(None, None))
        .await
        .expect("snap");
    lifecycle.remove_remote_lane().await.expect("remove");

    let error: PipelineError = lifecycle
        .export()
        .await
        .expect_err("export should fail")
        .into();

    match error {
        PipelineError::LaneOperation { step, message } => {
            assert_eq!(step, LaneStep::Export);
            assert!(message.contains("permission denied"), "unexpected: {message}");
        }
        other => panic!("expected LaneOperation, got {other:?}"),
    }
}
