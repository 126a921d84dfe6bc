//! Tests loading configuration from arguments and the environment.

use ortho_config::OrthoConfig;
use rstest::rstest;

use crate::LanesyncConfig;

/// Loads configuration with `HOME` pointed at an empty directory so no
/// stray dotfile is discovered.
fn load_with(env: &[(&str, Option<&str>)], cli_args: &[&str]) -> LanesyncConfig {
    let temp_dir = tempfile::TempDir::new().expect("temp dir should be created");
    let home = temp_dir.path().to_string_lossy().to_string();

    let lookup = |name: &str| {
        env.iter()
            .find(|(key, _)| *key == name)
            .and_then(|&(_, value)| value)
    };
    let _guard = env_lock::lock_env([
        ("LANESYNC_ORG", lookup("LANESYNC_ORG")),
        ("LANESYNC_LABEL_RETRY_DELAY_MS", lookup("LANESYNC_LABEL_RETRY_DELAY_MS")),
        ("HOME", Some(home.as_str())),
        ("XDG_CONFIG_HOME", Some(home.as_str())),
    ]);

    let mut args: Vec<std::ffi::OsString> = vec![std::ffi::OsString::from("lanesync")];
    args.extend(cli_args.iter().map(std::ffi::OsString::from));

    LanesyncConfig::load_from_iter(args).expect("config should load")
}

#[rstest]
fn prefixed_environment_variables_are_loaded() {
    let config = load_with(
        &[
            ("LANESYNC_ORG", Some("acme")),
            ("LANESYNC_LABEL_RETRY_DELAY_MS", Some("1500")),
        ],
        &[],
    );

    assert_eq!(config.org.as_deref(), Some("acme"));
    assert_eq!(config.label_retry_delay_ms, 1500);
}

#[rstest]
fn cli_flags_override_environment() {
    let config = load_with(
        &[("LANESYNC_ORG", Some("env-org"))],
        &["--org", "cli-org", "--pr-number", "7", "--skip-build"],
    );

    assert_eq!(config.org.as_deref(), Some("cli-org"));
    assert_eq!(config.pr_number, Some(7));
    assert!(config.skip_build);
}

#[rstest]
#[case::long(&["--branch", "feature/widget"], "feature/widget")]
#[case::short(&["-H", "pr-9"], "pr-9")]
fn branch_is_read_from_the_command_line(#[case] cli_args: &[&str], #[case] expected: &str) {
    let config = load_with(&[], cli_args);

    assert_eq!(config.branch.as_deref(), Some(expected));
}

#[rstest]
fn short_flags_address_distinct_fields() {
    let config = load_with(&[], &["-H", "pr-3", "-o", "acme", "-s", "design", "-p", "3"]);

    assert_eq!(config.branch.as_deref(), Some("pr-3"));
    assert_eq!(config.org.as_deref(), Some("acme"));
    assert_eq!(config.scope.as_deref(), Some("design"));
    assert_eq!(config.pr_number, Some(3));
    assert!(config.bit_token.is_none());
}
