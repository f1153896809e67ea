// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Expression leaves.
//!
//! Both kinds resolve two operands and apply an [`Operator`]. They differ in scope
//! and in what happens on failure:
//!
//! - [`ExpressionPolicy`] is request-scoped and denies on any resolution or
//!   comparison error, recording the error as the trace note.
//! - [`MemberExpressionPolicy`] reads its left operand from the bound member and
//!   returns errors to the enclosing member policy.
//!
//! `Exists` never errors on a missing path: absence is exactly what it asks about.

use serde_json::Value;

use crate::access::{Access, AccessResponse};
use crate::attributes::{AttributePath, ValueReference};
use crate::context::EvaluationContext;
use crate::error::{EvaluationResult, PolicyBuildError};
use crate::operator::Operator;
use crate::trace::{describe, AccessEvaluationTrace};

use super::{fail_closed, Evaluate};

/// Compares two request-scoped operands.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionPolicy {
	name: Option<String>,
	left: ValueReference,
	operator: Operator,
	right: ValueReference,
}

impl ExpressionPolicy {
	/// Fails if either operand is member-scoped.
	pub fn new(
		left: ValueReference,
		operator: Operator,
		right: ValueReference,
	) -> Result<Self, PolicyBuildError> {
		left.require_request_scope()?;
		right.require_request_scope()?;
		Ok(Self {
			name: None,
			left,
			operator,
			right,
		})
	}

	/// Granted when `reference` resolves to a non-null value.
	pub fn exists(reference: ValueReference) -> Result<Self, PolicyBuildError> {
		Self::new(reference, Operator::Exists, ValueReference::Literal(Value::Null))
	}

	/// Builder: set the trace name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn operator(&self) -> Operator {
		self.operator
	}

	pub fn description(&self) -> String {
		render(
			describe("ExpressionPolicy", self.name()),
			&self.left,
			self.operator,
			&self.right,
		)
	}

	pub(crate) fn decide(&self, ctx: &EvaluationContext<'_>) -> AccessResponse {
		match compare(&self.left, self.operator, &self.right, ctx) {
			Ok(outcome) => respond(ctx, self.description(), outcome),
			Err(error) => fail_closed(ctx, self.description(), error),
		}
	}
}

/// Compares an attribute of the bound member against any operand.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpressionPolicy {
	name: Option<String>,
	left: ValueReference,
	operator: Operator,
	right: ValueReference,
}

impl MemberExpressionPolicy {
	/// `path` is a dotted path inside the member, e.g. `role` or `profile.team`.
	pub fn new(
		path: &str,
		operator: Operator,
		right: ValueReference,
	) -> Result<Self, PolicyBuildError> {
		Ok(Self {
			name: None,
			left: ValueReference::Member {
				path: AttributePath::parse(path)?,
			},
			operator,
			right,
		})
	}

	pub fn exists(path: &str) -> Result<Self, PolicyBuildError> {
		Self::new(path, Operator::Exists, ValueReference::Literal(Value::Null))
	}

	/// Builder: set the trace name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}
}

impl Evaluate for MemberExpressionPolicy {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		let outcome = compare(&self.left, self.operator, &self.right, ctx)?;
		Ok(respond(ctx, self.description(), outcome))
	}

	fn description(&self) -> String {
		render(
			describe("MemberExpressionPolicy", self.name()),
			&self.left,
			self.operator,
			&self.right,
		)
	}
}

fn compare(
	left: &ValueReference,
	operator: Operator,
	right: &ValueReference,
	ctx: &EvaluationContext<'_>,
) -> EvaluationResult<bool> {
	if operator.is_unary() {
		return match left.resolve(ctx) {
			Ok(value) => operator.evaluate(value, &Value::Null),
			Err(error) if error.is_missing_attribute() => Ok(false),
			Err(error) => Err(error),
		};
	}

	let left = left.resolve(ctx)?;
	let right = right.resolve(ctx)?;
	operator.evaluate(left, right)
}

fn respond(ctx: &EvaluationContext<'_>, description: String, outcome: bool) -> AccessResponse {
	let access = if outcome {
		Access::granted()
	} else {
		Access::denied()
	};
	ctx.respond(access.clone(), AccessEvaluationTrace::new(description, access))
}

fn render(
	kind: String,
	left: &ValueReference,
	operator: Operator,
	right: &ValueReference,
) -> String {
	if operator.is_unary() {
		format!("{kind}: {left} {operator}")
	} else {
		format!("{kind}: {left} {operator} {right}")
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;

	use super::*;
	use crate::access::AccessRequest;
	use crate::error::EvaluationError;
	use serde_json::json;

	fn request() -> Arc<AccessRequest> {
		Arc::new(
			AccessRequest::new()
				.with_subject("id", "alice")
				.with_subject("clearance", 3)
				.with_subject("nickname", Value::Null)
				.with_resource("owner", "alice")
				.with_resource("tags", json!(["public", "beta"])),
		)
	}

	fn subject(path: &str) -> ValueReference {
		ValueReference::subject(path).unwrap()
	}

	fn resource(path: &str) -> ValueReference {
		ValueReference::resource(path).unwrap()
	}

	mod request_scope {
		use super::*;

		#[test]
		fn compares_two_attributes() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let owner = ExpressionPolicy::new(subject("id"), Operator::Equal, resource("owner")).unwrap();
			assert!(owner.decide(&ctx).is_granted());
		}

		#[test]
		fn adjacent_large_ids_are_different_owners() {
			let request = Arc::new(
				AccessRequest::new()
					.with_subject("id", 9007199254740993_u64)
					.with_resource("owner", 9007199254740992_u64),
			);
			let ctx = EvaluationContext::new(&request);
			let owner = ExpressionPolicy::new(subject("id"), Operator::Equal, resource("owner")).unwrap();
			assert!(owner.decide(&ctx).is_denied());
		}

		#[test]
		fn false_comparison_has_no_note() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = ExpressionPolicy::new(
				subject("clearance"),
				Operator::GreaterThan,
				ValueReference::literal(5),
			)
			.unwrap();
			let response = policy.decide(&ctx);
			assert!(response.is_denied());
			assert!(response.trace.unwrap().note.is_none());
		}

		#[test]
		fn missing_attribute_denies_with_note() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = ExpressionPolicy::new(
				subject("department"),
				Operator::Equal,
				ValueReference::literal("eng"),
			)
			.unwrap();
			let response = policy.decide(&ctx);
			assert!(response.is_denied());
			let note = response.trace.unwrap().note.unwrap();
			assert!(note.starts_with("NoSuchAttribute: subject.department"));
		}

		#[test]
		fn incomparable_operands_deny_with_note() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = ExpressionPolicy::new(
				subject("id"),
				Operator::GreaterThan,
				ValueReference::literal(1),
			)
			.unwrap();
			let response = policy.decide(&ctx);
			assert!(response.is_denied());
			assert!(response.trace.unwrap().note.unwrap().starts_with("Incomparable: "));
		}

		#[test]
		fn membership_in_resource_tags() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = ExpressionPolicy::new(
				ValueReference::literal("beta"),
				Operator::IsIn,
				resource("tags"),
			)
			.unwrap();
			assert!(policy.decide(&ctx).is_granted());
		}

		#[test]
		fn member_operands_are_rejected() {
			let err = ExpressionPolicy::new(
				ValueReference::member("role").unwrap(),
				Operator::Equal,
				ValueReference::literal("owner"),
			)
			.unwrap_err();
			assert_eq!(
				err,
				PolicyBuildError::MemberReferenceOutsideMemberScope("member.role".to_string())
			);
		}

		#[test]
		fn description_renders_the_comparison() {
			let policy = ExpressionPolicy::new(subject("id"), Operator::Equal, resource("owner"))
				.unwrap()
				.with_name("owner");
			assert_eq!(
				policy.description(),
				"ExpressionPolicy(name=owner): subject.id == resource.owner"
			);
		}
	}

	mod exists {
		use super::*;

		#[test]
		fn present_value_grants() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = ExpressionPolicy::exists(subject("id")).unwrap();
			assert!(policy.decide(&ctx).is_granted());
			assert_eq!(policy.description(), "ExpressionPolicy: subject.id exists");
		}

		#[test]
		fn missing_or_null_denies_without_note() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			for path in ["department", "nickname", "id.first"] {
				let response = ExpressionPolicy::exists(subject(path)).unwrap().decide(&ctx);
				assert!(response.is_denied(), "{path}");
				assert!(response.trace.unwrap().note.is_none(), "{path}");
			}
		}
	}

	mod member_scope {
		use super::*;

		#[test]
		fn reads_the_bound_member() {
			let request = request();
			let member = json!({"user": "alice", "role": "owner"});
			let ctx = EvaluationContext::new(&request);
			let scoped = ctx.with_member(member.as_object().unwrap());

			let policy =
				MemberExpressionPolicy::new("user", Operator::Equal, subject("id")).unwrap();
			assert!(policy.evaluate(&scoped).unwrap().is_granted());
		}

		#[test]
		fn missing_member_attribute_is_returned() {
			let request = request();
			let member = json!({"role": "owner"});
			let ctx = EvaluationContext::new(&request);
			let scoped = ctx.with_member(member.as_object().unwrap());

			let policy =
				MemberExpressionPolicy::new("user", Operator::Equal, subject("id")).unwrap();
			let err = policy.evaluate(&scoped).unwrap_err();
			assert_eq!(
				err,
				EvaluationError::NoSuchAttribute {
					path: "member.user".to_string(),
					segment: "user".to_string(),
				}
			);
		}

		#[test]
		fn unbound_member_is_an_error() {
			let request = request();
			let ctx = EvaluationContext::new(&request);
			let policy = MemberExpressionPolicy::exists("role").unwrap();
			assert!(matches!(
				policy.evaluate(&ctx),
				Err(EvaluationError::UnboundMember { .. })
			));
		}

		#[test]
		fn empty_path_is_rejected() {
			assert_eq!(
				MemberExpressionPolicy::new("", Operator::Equal, ValueReference::literal(1)),
				Err(PolicyBuildError::EmptyPath)
			);
		}
	}
}
