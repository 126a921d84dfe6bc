//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::LanesyncConfig;

/// Variables consulted as fallbacks, cleared by [`isolated_env`].
pub const FALLBACK_VARS: [&str; 9] = [
    "GITHUB_TOKEN",
    "GITHUB_REPOSITORY",
    "GITHUB_REF",
    "GITHUB_HEAD_REF",
    "GITHUB_API_URL",
    "BIT_CLOUD_ACCESS_TOKEN",
    "WSDIR",
    "ORG",
    "SCOPE",
];

/// Locks the environment with every fallback variable unset, except for
/// `overrides`.
pub fn isolated_env(overrides: &'static [(&'static str, &'static str)]) -> impl Sized {
    let value_of = |name: &str| {
        overrides
            .iter()
            .find(|(key, _)| *key == name)
            .map(|&(_, value)| value)
    };
    env_lock::lock_env(FALLBACK_VARS.map(|name| (name, value_of(name))))
}

/// Applies a configuration layer to the composer based on the layer type.
pub fn apply_layer(composer: &mut MergeComposer, layer_type: &str, value: Value) {
    match layer_type {
        "defaults" => composer.push_defaults(value),
        "file" => composer.push_file(value, None),
        "environment" => composer.push_environment(value),
        "cli" => composer.push_cli(value),
        _ => panic!("unknown layer type: {layer_type}"),
    }
}

/// Helper to compose a [`LanesyncConfig`] from a sequence of `(layer_type, value)` pairs.
pub fn build_config_from_layers(layers: &[(&str, Value)]) -> LanesyncConfig {
    let mut composer = MergeComposer::new();

    for (layer_type, value) in layers {
        apply_layer(&mut composer, layer_type, value.clone());
    }

    LanesyncConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}

/// A configuration with every required setting present.
pub fn complete_config() -> LanesyncConfig {
    LanesyncConfig {
        org: Some("acme".to_owned()),
        scope: Some("design".to_owned()),
        bit_token: Some("bit-token".to_owned()),
        github_token: Some("gh-token".to_owned()),
        repository: Some("acme/design-system".to_owned()),
        pr_number: Some(42),
        ..LanesyncConfig::default()
    }
}
