// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value resolution.
//!
//! A [`ValueReference`] names where a value comes from:
//!
//! - an attribute path inside one of the four request groups (`subject.profile.role`)
//! - an attribute path inside the collection member currently under evaluation
//!   (`member.role`), only valid inside a member policy
//! - a literal constant
//!
//! Resolution walks nested maps one key at a time and borrows the result from the
//! request, the bound member, or the reference itself. Nothing is cloned.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::access::Attributes;
use crate::context::EvaluationContext;
use crate::error::{EvaluationError, EvaluationResult, PolicyBuildError};

/// Selects one of the four attribute groups of an [`AccessRequest`](crate::AccessRequest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeGroup {
	Subject,
	Action,
	Resource,
	Environment,
}

impl fmt::Display for AttributeGroup {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			AttributeGroup::Subject => "subject",
			AttributeGroup::Action => "action",
			AttributeGroup::Resource => "resource",
			AttributeGroup::Environment => "environment",
		};
		write!(f, "{s}")
	}
}

/// A non-empty sequence of map keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AttributePath(Vec<String>);

impl AttributePath {
	/// Builds a path from its segments. Fails on an empty path or an empty segment.
	pub fn new<I, S>(segments: I) -> Result<Self, PolicyBuildError>
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let segments: Vec<String> = segments.into_iter().map(Into::into).collect();
		if segments.is_empty() {
			return Err(PolicyBuildError::EmptyPath);
		}
		if segments.iter().any(String::is_empty) {
			return Err(PolicyBuildError::EmptySegment(segments.join(".")));
		}
		Ok(Self(segments))
	}

	/// Parses a dotted path such as `profile.address.country`.
	pub fn parse(dotted: &str) -> Result<Self, PolicyBuildError> {
		if dotted.is_empty() {
			return Err(PolicyBuildError::EmptyPath);
		}
		Self::new(dotted.split('.'))
	}

	pub fn segments(&self) -> &[String] {
		&self.0
	}

	/// Walks `root` key by key.
	///
	/// `scope` is only used to name the full path in the error, e.g. `subject`.
	pub fn resolve<'a>(
		&self,
		root: &'a Attributes,
		scope: impl fmt::Display,
	) -> EvaluationResult<&'a Value> {
		let missing = |segment: &str| EvaluationError::NoSuchAttribute {
			path: format!("{scope}.{self}"),
			segment: segment.to_string(),
		};

		let (first, rest) = self
			.0
			.split_first()
			.ok_or_else(|| missing(""))?;
		let mut current = root.get(first).ok_or_else(|| missing(first))?;
		for segment in rest {
			current = current
				.as_object()
				.and_then(|map| map.get(segment))
				.ok_or_else(|| missing(segment))?;
		}
		Ok(current)
	}
}

impl fmt::Display for AttributePath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.0.join("."))
	}
}

impl FromStr for AttributePath {
	type Err = PolicyBuildError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

/// Where an operand's value comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueReference {
	/// A path into one of the request's attribute groups.
	Attribute {
		group: AttributeGroup,
		path: AttributePath,
	},
	/// A path into the collection member currently bound by a member policy.
	Member { path: AttributePath },
	/// A constant.
	Literal(Value),
}

impl ValueReference {
	pub fn attribute(group: AttributeGroup, path: &str) -> Result<Self, PolicyBuildError> {
		Ok(ValueReference::Attribute {
			group,
			path: AttributePath::parse(path)?,
		})
	}

	pub fn subject(path: &str) -> Result<Self, PolicyBuildError> {
		Self::attribute(AttributeGroup::Subject, path)
	}

	pub fn action(path: &str) -> Result<Self, PolicyBuildError> {
		Self::attribute(AttributeGroup::Action, path)
	}

	pub fn resource(path: &str) -> Result<Self, PolicyBuildError> {
		Self::attribute(AttributeGroup::Resource, path)
	}

	pub fn environment(path: &str) -> Result<Self, PolicyBuildError> {
		Self::attribute(AttributeGroup::Environment, path)
	}

	pub fn member(path: &str) -> Result<Self, PolicyBuildError> {
		Ok(ValueReference::Member {
			path: AttributePath::parse(path)?,
		})
	}

	pub fn literal(value: impl Into<Value>) -> Self {
		ValueReference::Literal(value.into())
	}

	/// Returns true if this reference needs a bound member to resolve.
	pub fn is_member_scoped(&self) -> bool {
		matches!(self, ValueReference::Member { .. })
	}

	/// Resolves the reference in `ctx`.
	pub fn resolve<'a>(&'a self, ctx: &EvaluationContext<'a>) -> EvaluationResult<&'a Value> {
		match self {
			ValueReference::Attribute { group, path } => {
				path.resolve(ctx.request().group(*group), group)
			}
			ValueReference::Member { path } => {
				let member = ctx.member().ok_or_else(|| EvaluationError::UnboundMember {
					path: format!("member.{path}"),
				})?;
				path.resolve(member, "member")
			}
			ValueReference::Literal(value) => Ok(value),
		}
	}

	/// Rejects member-scoped references; used by request-level policies.
	pub(crate) fn require_request_scope(&self) -> Result<(), PolicyBuildError> {
		if self.is_member_scoped() {
			return Err(PolicyBuildError::MemberReferenceOutsideMemberScope(
				self.to_string(),
			));
		}
		Ok(())
	}
}

impl fmt::Display for ValueReference {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			ValueReference::Attribute { group, path } => write!(f, "{group}.{path}"),
			ValueReference::Member { path } => write!(f, "member.{path}"),
			ValueReference::Literal(value) => write!(f, "{value}"),
		}
	}
}

impl From<Value> for ValueReference {
	fn from(value: Value) -> Self {
		ValueReference::Literal(value)
	}
}

/// JSON kind name, used in error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "map",
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::access::AccessRequest;
	use serde_json::json;
	use std::sync::Arc;

	fn request() -> Arc<AccessRequest> {
		Arc::new(
			AccessRequest::new()
				.with_subject("id", "alice")
				.with_subject("profile", json!({"address": {"country": "NZ"}, "tags": ["a"]})),
		)
	}

	mod paths {
		use super::*;

		#[test]
		fn parse_splits_on_dots() {
			let path = AttributePath::parse("profile.address.country").unwrap();
			assert_eq!(path.segments(), ["profile", "address", "country"]);
			assert_eq!(path.to_string(), "profile.address.country");
		}

		#[test]
		fn empty_paths_are_rejected() {
			assert_eq!(AttributePath::parse(""), Err(PolicyBuildError::EmptyPath));
			assert_eq!(
				AttributePath::new(Vec::<String>::new()),
				Err(PolicyBuildError::EmptyPath)
			);
			assert!(matches!(
				AttributePath::parse("a..b"),
				Err(PolicyBuildError::EmptySegment(_))
			));
		}

		#[test]
		fn from_str_matches_parse() {
			let path: AttributePath = "a.b".parse().unwrap();
			assert_eq!(path, AttributePath::parse("a.b").unwrap());
		}
	}

	mod resolution {
		use super::*;

		#[test]
		fn resolves_nested_subject_attribute() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::subject("profile.address.country").unwrap();
			assert_eq!(reference.resolve(&ctx).unwrap(), &json!("NZ"));
		}

		#[test]
		fn missing_key_names_the_failing_segment() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::subject("profile.phone.number").unwrap();
			let err = reference.resolve(&ctx).unwrap_err();
			assert_eq!(
				err,
				EvaluationError::NoSuchAttribute {
					path: "subject.profile.phone.number".to_string(),
					segment: "phone".to_string(),
				}
			);
		}

		#[test]
		fn non_map_mid_path_is_missing() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::subject("id.first").unwrap();
			let err = reference.resolve(&ctx).unwrap_err();
			assert!(err.is_missing_attribute());
			assert!(err.to_string().contains("'first'"));
		}

		#[test]
		fn empty_group_is_missing() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::environment("ip").unwrap();
			assert!(reference.resolve(&ctx).unwrap_err().is_missing_attribute());
		}

		#[test]
		fn literal_resolves_to_itself() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::literal(42);
			assert_eq!(reference.resolve(&ctx).unwrap(), &json!(42));
		}

		#[test]
		fn member_reference_uses_bound_member() {
			let request = request();
			let member = json!({"role": "owner"});
			let member = member.as_object().unwrap();
			let ctx = EvaluationContext::new(&request);
			let reference = ValueReference::member("role").unwrap();

			assert_eq!(
				reference.resolve(&ctx).unwrap_err(),
				EvaluationError::UnboundMember {
					path: "member.role".to_string()
				}
			);

			let scoped = ctx.with_member(member);
			assert_eq!(reference.resolve(&scoped).unwrap(), &json!("owner"));
		}
	}

	#[test]
	fn display_renders_scope_and_path() {
		assert_eq!(
			ValueReference::resource("owner.id").unwrap().to_string(),
			"resource.owner.id"
		);
		assert_eq!(ValueReference::member("role").unwrap().to_string(), "member.role");
		assert_eq!(ValueReference::literal("x").to_string(), "\"x\"");
	}

	#[test]
	fn request_scope_check() {
		assert!(ValueReference::literal(1).require_request_scope().is_ok());
		assert!(ValueReference::subject("id")
			.unwrap()
			.require_request_scope()
			.is_ok());
		assert!(matches!(
			ValueReference::member("id").unwrap().require_request_scope(),
			Err(PolicyBuildError::MemberReferenceOutsideMemberScope(_))
		));
	}
}
