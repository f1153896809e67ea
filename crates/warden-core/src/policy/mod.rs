// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Policy trees.
//!
//! A [`Policy`] is a closed set of node kinds evaluated against a whole
//! [`AccessRequest`]. A [`MemberPolicy`] is evaluated against one element of a
//! collection attribute, bound by an enclosing [`ForAnyMemberPolicy`] or
//! [`ForAllMembersPolicy`].
//!
//! Request-scoped evaluation cannot fail: every leaf converts its own errors into a
//! `Denied` response with a trace note. Member-scoped evaluation returns
//! [`EvaluationResult`] so the enclosing member policy can fail closed as a whole.

mod boolean;
mod constant;
mod expression;
mod members;

use std::sync::Arc;

use tracing::{debug, instrument};

pub use boolean::{AllOf, AnyOf, Not};
pub use constant::ConstantPolicy;
pub use expression::{ExpressionPolicy, MemberExpressionPolicy};
pub use members::{ForAllMembersPolicy, ForAnyMemberPolicy};

use crate::access::{Access, AccessRequest, AccessResponse, Attributes};
use crate::context::EvaluationContext;
use crate::error::{EvaluationError, EvaluationResult};
use crate::trace::AccessEvaluationTrace;

/// Evaluation shared by request-scoped and member-scoped nodes.
///
/// The boolean combinators are generic over this trait so [`AllOf`], [`AnyOf`] and
/// [`Not`] behave identically at both scopes.
pub trait Evaluate {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse>;

	/// Trace description of this node.
	fn description(&self) -> String;
}

/// A request-scoped policy node.
#[derive(Debug, Clone, PartialEq)]
pub enum Policy {
	AllOf(AllOf<Policy>),
	AnyOf(AnyOf<Policy>),
	Not(Not<Policy>),
	ForAnyMember(ForAnyMemberPolicy),
	ForAllMembers(ForAllMembersPolicy),
	Expression(ExpressionPolicy),
	Constant(ConstantPolicy),
}

impl Policy {
	/// Conjunction of `policies`.
	pub fn all_of(policies: impl IntoIterator<Item = Policy>) -> Self {
		Policy::AllOf(AllOf::new(policies))
	}

	/// Disjunction of `policies`.
	pub fn any_of(policies: impl IntoIterator<Item = Policy>) -> Self {
		Policy::AnyOf(AnyOf::new(policies))
	}

	/// Negation of `policy`.
	#[allow(clippy::should_implement_trait)]
	pub fn not(policy: Policy) -> Self {
		Policy::Not(Not::new(policy))
	}

	/// A leaf that always grants.
	pub fn grant() -> Self {
		Policy::Constant(ConstantPolicy::new(Access::granted()))
	}

	/// A leaf that always denies.
	pub fn deny() -> Self {
		Policy::Constant(ConstantPolicy::new(Access::denied()))
	}

	pub fn name(&self) -> Option<&str> {
		match self {
			Policy::AllOf(p) => p.name(),
			Policy::AnyOf(p) => p.name(),
			Policy::Not(p) => p.name(),
			Policy::ForAnyMember(p) => p.name(),
			Policy::ForAllMembers(p) => p.name(),
			Policy::Expression(p) => p.name(),
			Policy::Constant(p) => p.name(),
		}
	}

	/// Evaluates `request` against this tree.
	///
	/// Always returns a response; resolution and comparison failures deny.
	#[instrument(level = "debug", skip_all, fields(policy = %self.description()))]
	pub fn check_authorized(&self, request: impl Into<Arc<AccessRequest>>) -> AccessResponse {
		let request = request.into();
		let ctx = EvaluationContext::new(&request);
		let response = self.decide(&ctx);
		debug!(access = %response.access, "policy evaluated");
		response
	}

	/// Evaluates this node in an existing context.
	pub fn decide(&self, ctx: &EvaluationContext<'_>) -> AccessResponse {
		match self {
			Policy::AllOf(p) => p
				.evaluate(ctx)
				.unwrap_or_else(|error| fail_closed(ctx, p.description(), error)),
			Policy::AnyOf(p) => p
				.evaluate(ctx)
				.unwrap_or_else(|error| fail_closed(ctx, p.description(), error)),
			Policy::Not(p) => p
				.evaluate(ctx)
				.unwrap_or_else(|error| fail_closed(ctx, p.description(), error)),
			Policy::ForAnyMember(p) => p.decide(ctx),
			Policy::ForAllMembers(p) => p.decide(ctx),
			Policy::Expression(p) => p.decide(ctx),
			Policy::Constant(p) => p.decide(ctx),
		}
	}
}

impl Evaluate for Policy {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		Ok(self.decide(ctx))
	}

	fn description(&self) -> String {
		match self {
			Policy::AllOf(p) => p.description(),
			Policy::AnyOf(p) => p.description(),
			Policy::Not(p) => p.description(),
			Policy::ForAnyMember(p) => p.description(),
			Policy::ForAllMembers(p) => p.description(),
			Policy::Expression(p) => p.description(),
			Policy::Constant(p) => p.description(),
		}
	}
}

impl From<AllOf<Policy>> for Policy {
	fn from(policy: AllOf<Policy>) -> Self {
		Policy::AllOf(policy)
	}
}

impl From<AnyOf<Policy>> for Policy {
	fn from(policy: AnyOf<Policy>) -> Self {
		Policy::AnyOf(policy)
	}
}

impl From<Not<Policy>> for Policy {
	fn from(policy: Not<Policy>) -> Self {
		Policy::Not(policy)
	}
}

impl From<ForAnyMemberPolicy> for Policy {
	fn from(policy: ForAnyMemberPolicy) -> Self {
		Policy::ForAnyMember(policy)
	}
}

impl From<ForAllMembersPolicy> for Policy {
	fn from(policy: ForAllMembersPolicy) -> Self {
		Policy::ForAllMembers(policy)
	}
}

impl From<ExpressionPolicy> for Policy {
	fn from(policy: ExpressionPolicy) -> Self {
		Policy::Expression(policy)
	}
}

impl From<ConstantPolicy> for Policy {
	fn from(policy: ConstantPolicy) -> Self {
		Policy::Constant(policy)
	}
}

/// A policy evaluated against one bound collection member.
#[derive(Debug, Clone, PartialEq)]
pub enum MemberPolicy {
	Expression(MemberExpressionPolicy),
	AllOf(AllOf<MemberPolicy>),
	AnyOf(AnyOf<MemberPolicy>),
	Not(Not<MemberPolicy>),
}

impl MemberPolicy {
	pub fn all_of(policies: impl IntoIterator<Item = MemberPolicy>) -> Self {
		MemberPolicy::AllOf(AllOf::new(policies))
	}

	pub fn any_of(policies: impl IntoIterator<Item = MemberPolicy>) -> Self {
		MemberPolicy::AnyOf(AnyOf::new(policies))
	}

	#[allow(clippy::should_implement_trait)]
	pub fn not(policy: MemberPolicy) -> Self {
		MemberPolicy::Not(Not::new(policy))
	}

	/// Evaluates this policy with `member` bound.
	///
	/// Unlike [`Policy::check_authorized`], errors are returned to the caller.
	pub fn check_authorized(
		&self,
		member: &Attributes,
		request: impl Into<Arc<AccessRequest>>,
	) -> EvaluationResult<AccessResponse> {
		let request = request.into();
		let ctx = EvaluationContext::new(&request);
		self.evaluate(&ctx.with_member(member))
	}
}

impl Evaluate for MemberPolicy {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		match self {
			MemberPolicy::Expression(p) => p.evaluate(ctx),
			MemberPolicy::AllOf(p) => p.evaluate(ctx),
			MemberPolicy::AnyOf(p) => p.evaluate(ctx),
			MemberPolicy::Not(p) => p.evaluate(ctx),
		}
	}

	fn description(&self) -> String {
		match self {
			MemberPolicy::Expression(p) => p.description(),
			MemberPolicy::AllOf(p) => p.description(),
			MemberPolicy::AnyOf(p) => p.description(),
			MemberPolicy::Not(p) => p.description(),
		}
	}
}

impl From<MemberExpressionPolicy> for MemberPolicy {
	fn from(policy: MemberExpressionPolicy) -> Self {
		MemberPolicy::Expression(policy)
	}
}

impl From<AllOf<MemberPolicy>> for MemberPolicy {
	fn from(policy: AllOf<MemberPolicy>) -> Self {
		MemberPolicy::AllOf(policy)
	}
}

impl From<AnyOf<MemberPolicy>> for MemberPolicy {
	fn from(policy: AnyOf<MemberPolicy>) -> Self {
		MemberPolicy::AnyOf(policy)
	}
}

impl From<Not<MemberPolicy>> for MemberPolicy {
	fn from(policy: Not<MemberPolicy>) -> Self {
		MemberPolicy::Not(policy)
	}
}

/// Converts an evaluation error into a `Denied` response whose trace note is the
/// rendered error.
pub(crate) fn fail_closed(
	ctx: &EvaluationContext<'_>,
	description: String,
	error: EvaluationError,
) -> AccessResponse {
	debug!(policy = %description, %error, "evaluation failed closed");
	let trace = AccessEvaluationTrace::new(description, Access::denied()).with_note(error.to_string());
	ctx.respond(Access::denied(), trace)
}
