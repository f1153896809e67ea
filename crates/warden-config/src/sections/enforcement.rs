// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP enforcement configuration.

use serde::Deserialize;

use crate::error::ConfigError;

pub const DEFAULT_NOT_ENFORCED_STATUS: u16 = 401;
pub const DEFAULT_DENIED_STATUS: u16 = 403;

/// Enforcement configuration (runtime, fully resolved).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnforcementConfig {
	/// Status sent when a handler neither enforced nor ignored the call.
	pub not_enforced_status: u16,
	/// Status sent when the policy denies.
	pub denied_status: u16,
	/// Include the denial's properties in the response body.
	pub expose_denial_properties: bool,
	/// Keep evaluation traces on returned responses.
	pub include_trace: bool,
	/// Path prefixes that never require enforcement, e.g. `/health`.
	pub exempt_paths: Vec<String>,
}

impl Default for EnforcementConfig {
	fn default() -> Self {
		Self {
			not_enforced_status: DEFAULT_NOT_ENFORCED_STATUS,
			denied_status: DEFAULT_DENIED_STATUS,
			expose_denial_properties: false,
			include_trace: false,
			exempt_paths: Vec::new(),
		}
	}
}

impl EnforcementConfig {
	/// Returns true if `path` equals an exempt path or lies beneath one.
	pub fn is_exempt(&self, path: &str) -> bool {
		self.exempt_paths.iter().any(|prefix| {
			path == prefix
				|| path
					.strip_prefix(prefix.as_str())
					.is_some_and(|rest| prefix.ends_with('/') || rest.starts_with('/'))
		})
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		validate_status("enforcement.not_enforced_status", self.not_enforced_status)?;
		validate_status("enforcement.denied_status", self.denied_status)?;

		if let Some(path) = self.exempt_paths.iter().find(|p| !p.starts_with('/')) {
			return Err(ConfigError::Validation(format!(
				"enforcement.exempt_paths entry '{path}' must start with '/'"
			)));
		}
		Ok(())
	}
}

fn validate_status(key: &str, status: u16) -> Result<(), ConfigError> {
	if !(400..=599).contains(&status) {
		return Err(ConfigError::Validation(format!(
			"{key} must be an HTTP error status (400-599), got {status}"
		)));
	}
	Ok(())
}

/// Enforcement configuration layer (partial, for merging).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnforcementConfigLayer {
	#[serde(default)]
	pub not_enforced_status: Option<u16>,
	#[serde(default)]
	pub denied_status: Option<u16>,
	#[serde(default)]
	pub expose_denial_properties: Option<bool>,
	#[serde(default)]
	pub include_trace: Option<bool>,
	#[serde(default)]
	pub exempt_paths: Option<Vec<String>>,
}

impl EnforcementConfigLayer {
	pub fn merge(&mut self, other: EnforcementConfigLayer) {
		if other.not_enforced_status.is_some() {
			self.not_enforced_status = other.not_enforced_status;
		}
		if other.denied_status.is_some() {
			self.denied_status = other.denied_status;
		}
		if other.expose_denial_properties.is_some() {
			self.expose_denial_properties = other.expose_denial_properties;
		}
		if other.include_trace.is_some() {
			self.include_trace = other.include_trace;
		}
		if other.exempt_paths.is_some() {
			self.exempt_paths = other.exempt_paths;
		}
	}

	pub fn finalize(self) -> EnforcementConfig {
		EnforcementConfig {
			not_enforced_status: self
				.not_enforced_status
				.unwrap_or(DEFAULT_NOT_ENFORCED_STATUS),
			denied_status: self.denied_status.unwrap_or(DEFAULT_DENIED_STATUS),
			expose_denial_properties: self.expose_denial_properties.unwrap_or(false),
			include_trace: self.include_trace.unwrap_or(false),
			exempt_paths: self.exempt_paths.unwrap_or_default(),
		}
	}
}
