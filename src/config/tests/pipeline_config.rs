//! Tests for validating configuration into a `PipelineConfig`.

use std::time::Duration;

use rstest::rstest;
use semver::Version;

use super::helpers::{complete_config, isolated_env};
use crate::LanesyncConfig;
use crate::error::PipelineError;
use crate::labels::Bump;

#[rstest]
fn complete_configuration_converts() {
    let _guard = isolated_env(&[("GITHUB_HEAD_REF", "feature/widget")]);
    let config = LanesyncConfig {
        pr_title: Some("Add widget".to_owned()),
        version_bump: "Minor".to_owned(),
        min_bit_version: Some("v1.6.0".to_owned()),
        ..complete_config()
    };

    let pipeline = config.pipeline_config().expect("configuration should convert");

    assert_eq!(pipeline.scope.qualified(), "acme.design");
    assert_eq!(pipeline.pull_request.number().get(), 42);
    assert_eq!(pipeline.pull_request.owner().as_str(), "acme");
    assert_eq!(pipeline.pr_title.as_deref(), Some("Add widget"));
    assert_eq!(pipeline.branch.as_deref(), Some("feature/widget"));
    assert_eq!(pipeline.min_tool_version, Version::new(1, 6, 0));
    assert_eq!(pipeline.registry_host, "bit.cloud");
    assert_eq!(
        pipeline.version_labels.as_ref().map(|settings| settings.bump),
        Some(Bump::Minor)
    );
    assert_eq!(pipeline.lane_url_prefix(), "https://bit.cloud/acme/design/~lane/");
}

#[rstest]
fn version_labels_can_be_disabled() {
    let _guard = isolated_env(&[]);
    let config = LanesyncConfig {
        no_version_labels: true,
        version_bump: "not-a-bump".to_owned(),
        ..complete_config()
    };

    let pipeline = config.pipeline_config().expect("configuration should convert");

    assert!(pipeline.version_labels.is_none());
}

#[rstest]
#[case::missing_org(LanesyncConfig { org: None, ..complete_config() }, "organisation")]
#[case::missing_repository(LanesyncConfig { repository: None, ..complete_config() }, "repository")]
#[case::missing_number(LanesyncConfig { pr_number: None, ..complete_config() }, "pull request number")]
#[case::bad_bump(LanesyncConfig { version_bump: "huge".to_owned(), ..complete_config() }, "huge")]
#[case::bad_colour(LanesyncConfig { patch_color: "green".to_owned(), ..complete_config() }, "green")]
#[case::bad_pattern(LanesyncConfig { lane_branch_pattern: "(".to_owned(), ..complete_config() }, "lane branch pattern")]
#[case::bad_version(LanesyncConfig { min_bit_version: Some("one".to_owned()), ..complete_config() }, "minimum tool version")]
#[case::bad_slug(LanesyncConfig { repository: Some("no-slash".to_owned()), ..complete_config() }, "no-slash")]
fn invalid_configuration_is_reported(#[case] config: LanesyncConfig, #[case] fragment: &str) {
    let _guard = isolated_env(&[]);

    let error = config
        .pipeline_config()
        .expect_err("configuration should be rejected");

    match error {
        PipelineError::Configuration { message } => {
            assert!(message.contains(fragment), "`{message}` should mention `{fragment}`");
        }
        other => panic!("expected Configuration, got {other:?}"),
    }
}

#[rstest]
fn retry_delay_is_expressed_in_milliseconds() {
    let config = LanesyncConfig {
        label_retry_delay_ms: 250,
        ..LanesyncConfig::default()
    };

    assert_eq!(config.label_retry_delay(), Duration::from_millis(250));
}
