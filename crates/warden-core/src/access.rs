// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Request and decision types.
//!
//! - [`AccessRequest`]: the four attribute groups a policy is evaluated against
//! - [`Access`]: the outcome, `Granted` or `Denied`, each with optional properties
//! - [`AccessResponse`]: the outcome paired with the request and an optional trace
//!
//! All types are serializable so decisions can be logged, audited, or returned in
//! an HTTP body.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::attributes::AttributeGroup;
use crate::trace::AccessEvaluationTrace;

/// A map of attribute name to dynamically typed value.
pub type Attributes = serde_json::Map<String, Value>;

/// Free-form properties attached to an [`Access`] outcome, e.g. a denial reason.
pub type Properties = serde_json::Map<String, Value>;

/// The attributes a policy is evaluated against.
///
/// Requests are immutable once handed to a policy; evaluation only ever borrows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRequest {
	#[serde(default)]
	pub subject: Attributes,
	#[serde(default)]
	pub action: Attributes,
	#[serde(default)]
	pub resource: Attributes,
	#[serde(default)]
	pub environment: Attributes,
}

impl AccessRequest {
	/// Creates a request with all four groups empty.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns the attribute group selected by `group`.
	pub fn group(&self, group: AttributeGroup) -> &Attributes {
		match group {
			AttributeGroup::Subject => &self.subject,
			AttributeGroup::Action => &self.action,
			AttributeGroup::Resource => &self.resource,
			AttributeGroup::Environment => &self.environment,
		}
	}

	/// Builder: set one subject attribute.
	pub fn with_subject(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.subject.insert(key.into(), value.into());
		self
	}

	/// Builder: set one action attribute.
	pub fn with_action(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.action.insert(key.into(), value.into());
		self
	}

	/// Builder: set one resource attribute.
	pub fn with_resource(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.resource.insert(key.into(), value.into());
		self
	}

	/// Builder: set one environment attribute.
	pub fn with_environment(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
		self.environment.insert(key.into(), value.into());
		self
	}

	/// Builder: replace the whole resource group.
	pub fn with_resource_attributes(mut self, resource: Attributes) -> Self {
		self.resource = resource;
		self
	}
}

/// The outcome of an evaluation. There is no third state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "access", rename_all = "snake_case")]
pub enum Access {
	Granted {
		#[serde(default, skip_serializing_if = "Properties::is_empty")]
		properties: Properties,
	},
	Denied {
		#[serde(default, skip_serializing_if = "Properties::is_empty")]
		properties: Properties,
	},
}

impl Access {
	/// A fresh `Granted` with no properties.
	pub fn granted() -> Self {
		Access::Granted {
			properties: Properties::new(),
		}
	}

	/// A fresh `Denied` with no properties.
	pub fn denied() -> Self {
		Access::Denied {
			properties: Properties::new(),
		}
	}

	pub fn granted_with(properties: Properties) -> Self {
		Access::Granted { properties }
	}

	pub fn denied_with(properties: Properties) -> Self {
		Access::Denied { properties }
	}

	/// A `Denied` carrying a single `reason` property.
	pub fn denied_because(reason: impl Into<String>) -> Self {
		let mut properties = Properties::new();
		properties.insert("reason".to_string(), Value::String(reason.into()));
		Access::Denied { properties }
	}

	pub fn is_granted(&self) -> bool {
		matches!(self, Access::Granted { .. })
	}

	pub fn is_denied(&self) -> bool {
		matches!(self, Access::Denied { .. })
	}

	pub fn properties(&self) -> &Properties {
		match self {
			Access::Granted { properties } | Access::Denied { properties } => properties,
		}
	}

	/// The opposite variant, with properties dropped.
	///
	/// "Not denied for reason X" does not mean "granted for reason X", so nothing is
	/// carried across.
	pub fn negated(&self) -> Self {
		match self {
			Access::Granted { .. } => Access::denied(),
			Access::Denied { .. } => Access::granted(),
		}
	}

	/// Short label used in traces and logs.
	pub fn label(&self) -> &'static str {
		match self {
			Access::Granted { .. } => "Granted",
			Access::Denied { .. } => "Denied",
		}
	}
}

impl std::fmt::Display for Access {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.label())
	}
}

/// An [`Access`] outcome, the request that produced it, and optionally the trace
/// explaining it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessResponse {
	pub access: Access,
	pub request: Arc<AccessRequest>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub trace: Option<AccessEvaluationTrace>,
}

impl AccessResponse {
	pub fn new(access: Access, request: Arc<AccessRequest>) -> Self {
		Self {
			access,
			request,
			trace: None,
		}
	}

	/// Builder: attach a trace.
	pub fn with_trace(mut self, trace: AccessEvaluationTrace) -> Self {
		self.trace = Some(trace);
		self
	}

	/// Builder: drop the trace.
	pub fn without_trace(mut self) -> Self {
		self.trace = None;
		self
	}

	pub fn is_granted(&self) -> bool {
		self.access.is_granted()
	}

	pub fn is_denied(&self) -> bool {
		self.access.is_denied()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn builders_populate_the_right_group() {
		let request = AccessRequest::new()
			.with_subject("id", "alice")
			.with_action("type", "read")
			.with_resource("owner", "alice")
			.with_environment("ip", "10.0.0.1");

		assert_eq!(request.group(AttributeGroup::Subject)["id"], json!("alice"));
		assert_eq!(request.group(AttributeGroup::Action)["type"], json!("read"));
		assert_eq!(request.group(AttributeGroup::Resource)["owner"], json!("alice"));
		assert_eq!(
			request.group(AttributeGroup::Environment)["ip"],
			json!("10.0.0.1")
		);
	}

	#[test]
	fn negation_drops_properties() {
		let denied = Access::denied_because("not the owner");
		assert_eq!(denied.properties()["reason"], json!("not the owner"));

		let flipped = denied.negated();
		assert!(flipped.is_granted());
		assert!(flipped.properties().is_empty());
		assert!(flipped.negated().is_denied());
	}

	#[test]
	fn access_serializes_with_tag() {
		let value = serde_json::to_value(Access::denied_because("nope")).unwrap();
		assert_eq!(
			value,
			json!({"access": "denied", "properties": {"reason": "nope"}})
		);

		let granted = serde_json::to_value(Access::granted()).unwrap();
		assert_eq!(granted, json!({"access": "granted"}));
	}

	#[test]
	fn request_deserializes_missing_groups_as_empty() {
		let request: AccessRequest =
			serde_json::from_value(json!({"subject": {"id": "bob"}})).unwrap();
		assert_eq!(request.subject["id"], json!("bob"));
		assert!(request.action.is_empty());
		assert!(request.resource.is_empty());
		assert!(request.environment.is_empty());
	}

	#[test]
	fn response_trace_builders() {
		let request = Arc::new(AccessRequest::new());
		let trace = AccessEvaluationTrace::new("AllOf", Access::granted());
		let response = AccessResponse::new(Access::granted(), request).with_trace(trace);
		assert!(response.trace.is_some());
		assert!(response.is_granted());
		assert!(response.without_trace().trace.is_none());
	}
}
