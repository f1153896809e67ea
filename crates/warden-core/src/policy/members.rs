// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Quantifiers over a collection attribute.
//!
//! The member source must resolve to an array whose elements are all maps. Each
//! element is bound into a child [`EvaluationContext`] while the member policies run
//! against it; the binding is dropped before the next element.
//!
//! Any error (a bad source, a non-map element, a missing member attribute, an
//! incomparable operand) denies the whole policy with the rendered error as the
//! trace note.

use crate::access::{Access, AccessResponse, Attributes};
use crate::attributes::{value_kind, ValueReference};
use crate::context::EvaluationContext;
use crate::error::{EvaluationError, EvaluationResult, PolicyBuildError};
use crate::trace::{describe, AccessEvaluationTrace};

use super::{fail_closed, Evaluate, MemberPolicy};

/// Granted if at least one member satisfies every member policy.
#[derive(Debug, Clone, PartialEq)]
pub struct ForAnyMemberPolicy {
	name: Option<String>,
	source: ValueReference,
	policies: Vec<MemberPolicy>,
}

impl ForAnyMemberPolicy {
	pub fn new(
		source: ValueReference,
		policies: impl IntoIterator<Item = MemberPolicy>,
	) -> Result<Self, PolicyBuildError> {
		let (source, policies) = validate(source, policies)?;
		Ok(Self {
			name: None,
			source,
			policies,
		})
	}

	/// Builder: set the trace name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn description(&self) -> String {
		describe("ForAnyMemberPolicy", self.name())
	}

	pub(crate) fn decide(&self, ctx: &EvaluationContext<'_>) -> AccessResponse {
		self
			.try_decide(ctx)
			.unwrap_or_else(|error| fail_closed(ctx, self.description(), error))
	}

	fn try_decide(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		let mut children = Vec::new();
		for member in members(&self.source, ctx)? {
			let scoped = ctx.with_member(member);
			let mut denied = false;
			let mut member_traces = Vec::with_capacity(self.policies.len());
			for policy in &self.policies {
				let response = policy.evaluate(&scoped)?;
				denied |= response.is_denied();
				member_traces.extend(response.trace);
			}

			if !denied {
				let trace = AccessEvaluationTrace::new(self.description(), Access::granted())
					.with_children(member_traces);
				return Ok(ctx.respond(Access::granted(), trace));
			}
			children.extend(member_traces);
		}

		let trace =
			AccessEvaluationTrace::new(self.description(), Access::denied()).with_children(children);
		Ok(ctx.respond(Access::denied(), trace))
	}
}

/// Granted if every member satisfies every member policy. An empty collection grants.
#[derive(Debug, Clone, PartialEq)]
pub struct ForAllMembersPolicy {
	name: Option<String>,
	source: ValueReference,
	policies: Vec<MemberPolicy>,
}

impl ForAllMembersPolicy {
	pub fn new(
		source: ValueReference,
		policies: impl IntoIterator<Item = MemberPolicy>,
	) -> Result<Self, PolicyBuildError> {
		let (source, policies) = validate(source, policies)?;
		Ok(Self {
			name: None,
			source,
			policies,
		})
	}

	/// Builder: set the trace name.
	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn description(&self) -> String {
		describe("ForAllMembersPolicy", self.name())
	}

	pub(crate) fn decide(&self, ctx: &EvaluationContext<'_>) -> AccessResponse {
		self
			.try_decide(ctx)
			.unwrap_or_else(|error| fail_closed(ctx, self.description(), error))
	}

	fn try_decide(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		let mut children = Vec::new();
		for member in members(&self.source, ctx)? {
			let scoped = ctx.with_member(member);
			for policy in &self.policies {
				let response = policy.evaluate(&scoped)?;
				if response.is_denied() {
					return Ok(response);
				}
				children.extend(response.trace);
			}
		}

		let trace =
			AccessEvaluationTrace::new(self.description(), Access::granted()).with_children(children);
		Ok(ctx.respond(Access::granted(), trace))
	}
}

fn validate(
	source: ValueReference,
	policies: impl IntoIterator<Item = MemberPolicy>,
) -> Result<(ValueReference, Vec<MemberPolicy>), PolicyBuildError> {
	source.require_request_scope()?;
	let policies: Vec<MemberPolicy> = policies.into_iter().collect();
	if policies.is_empty() {
		return Err(PolicyBuildError::EmptyMemberPolicies);
	}
	Ok((source, policies))
}

/// Resolves `source` to a list of member maps, rejecting anything else up front.
fn members<'a>(
	source: &'a ValueReference,
	ctx: &EvaluationContext<'a>,
) -> EvaluationResult<Vec<&'a Attributes>> {
	let value = source.resolve(ctx)?;
	let items = value.as_array().ok_or_else(|| {
		EvaluationError::InvalidMember(format!(
			"{source} is a {}, not a collection",
			value_kind(value)
		))
	})?;

	items
		.iter()
		.enumerate()
		.map(|(index, item)| {
			item.as_object().ok_or_else(|| {
				EvaluationError::InvalidMember(format!(
					"element {index} of {source} is a {}, not a map",
					value_kind(item)
				))
			})
		})
		.collect()
}
