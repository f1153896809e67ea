// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Loading configuration from TOML files layered under the environment.

use std::io::Write;

use tempfile::NamedTempFile;
use warden_config::{
	load_config_from_sources, ConfigError, ConfigSource, DefaultsSource, EnvSource, TomlSource,
};

fn toml_file(content: &str) -> NamedTempFile {
	let mut file = NamedTempFile::new().unwrap();
	file.write_all(content.as_bytes()).unwrap();
	file
}

fn no_env() -> EnvSource {
	EnvSource::with_lookup(|_| None)
}

/// Values from the file replace defaults.
#[test]
fn test_file_overrides_defaults() {
	let file = toml_file(
		r#"
[enforcement]
not_enforced_status = 500
expose_denial_properties = true
exempt_paths = ["/health", "/metrics"]
"#,
	);

	let config = load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(file.path())),
		Box::new(no_env()),
	])
	.unwrap();

	assert_eq!(config.enforcement.not_enforced_status, 500);
	assert_eq!(config.enforcement.denied_status, 403);
	assert!(config.enforcement.expose_denial_properties);
	assert!(config.enforcement.is_exempt("/metrics"));
}

/// Environment variables win over the file.
/// **Why Important**: Deployments override packaged files through the environment.
#[test]
fn test_environment_overrides_file() {
	let file = toml_file(
		r#"
[enforcement]
denied_status = 404
include_trace = true
"#,
	);
	let env = EnvSource::with_lookup(|name| match name {
		"WARDEN_ENFORCEMENT_INCLUDE_TRACE" => Some("false".to_string()),
		_ => None,
	});

	let config = load_config_from_sources(vec![
		Box::new(env),
		Box::new(TomlSource::new(file.path())),
		Box::new(DefaultsSource),
	])
	.unwrap();

	assert_eq!(config.enforcement.denied_status, 404);
	assert!(!config.enforcement.include_trace);
}

/// A malformed file is an error naming the file.
#[test]
fn test_malformed_file_is_reported() {
	let file = toml_file("[enforcement\ndenied_status = ");
	let err = TomlSource::new(file.path()).load().unwrap_err();
	match err {
		ConfigError::TomlParse { path, .. } => assert_eq!(path, file.path()),
		other => panic!("expected TomlParse, got {other:?}"),
	}
}

/// A wrongly typed field is a parse error, not a silent default.
#[test]
fn test_wrong_type_is_reported() {
	let file = toml_file("[enforcement]\ndenied_status = \"forbidden\"\n");
	let result = load_config_from_sources(vec![Box::new(TomlSource::new(file.path()))]);
	assert!(matches!(result, Err(ConfigError::TomlParse { .. })));
}

/// A file that parses but fails validation is rejected.
#[test]
fn test_file_values_are_validated() {
	let file = toml_file("[enforcement]\ndenied_status = 200\n");
	let result = load_config_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(file.path())),
	]);
	assert!(matches!(result, Err(ConfigError::Validation(_))));
}

/// An empty file yields defaults.
#[test]
fn test_empty_file_yields_defaults() {
	let file = toml_file("");
	let config = load_config_from_sources(vec![Box::new(TomlSource::new(file.path()))]).unwrap();
	assert_eq!(config.enforcement, Default::default());
}
