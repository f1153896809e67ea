// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Boolean combinators.
//!
//! `AllOf` and `AnyOf` short-circuit on the first decisive child and return that
//! child's response untouched, so the caller sees the properties and trace of the
//! branch that actually decided. When no child is decisive they build a fresh
//! response whose trace holds every child trace. `Not` always builds a fresh
//! response and drops the child's properties.

use crate::access::{Access, AccessResponse};
use crate::context::EvaluationContext;
use crate::error::EvaluationResult;
use crate::trace::{describe, AccessEvaluationTrace};

use super::Evaluate;

/// Granted only if every child grants. Empty is Denied.
#[derive(Debug, Clone, PartialEq)]
pub struct AllOf<P> {
	name: Option<String>,
	policies: Vec<P>,
}

impl<P> AllOf<P> {
	pub fn new(policies: impl IntoIterator<Item = P>) -> Self {
		Self {
			name: None,
			policies: policies.into_iter().collect(),
		}
	}

	pub fn named(name: impl Into<String>, policies: impl IntoIterator<Item = P>) -> Self {
		Self {
			name: Some(name.into()),
			policies: policies.into_iter().collect(),
		}
	}

	/// Builder: append a child.
	pub fn with_policy(mut self, policy: P) -> Self {
		self.policies.push(policy);
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn policies(&self) -> &[P] {
		&self.policies
	}
}

impl<P: Evaluate> Evaluate for AllOf<P> {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		if self.policies.is_empty() {
			return Ok(ctx.respond(
				Access::denied(),
				AccessEvaluationTrace::new(self.description(), Access::denied()),
			));
		}

		let mut children = Vec::with_capacity(self.policies.len());
		for policy in &self.policies {
			let response = policy.evaluate(ctx)?;
			if response.is_denied() {
				return Ok(response);
			}
			children.extend(response.trace);
		}

		let trace =
			AccessEvaluationTrace::new(self.description(), Access::granted()).with_children(children);
		Ok(ctx.respond(Access::granted(), trace))
	}

	fn description(&self) -> String {
		describe("AllOf", self.name())
	}
}

/// Granted if any child grants. Empty is Denied.
#[derive(Debug, Clone, PartialEq)]
pub struct AnyOf<P> {
	name: Option<String>,
	policies: Vec<P>,
}

impl<P> AnyOf<P> {
	pub fn new(policies: impl IntoIterator<Item = P>) -> Self {
		Self {
			name: None,
			policies: policies.into_iter().collect(),
		}
	}

	pub fn named(name: impl Into<String>, policies: impl IntoIterator<Item = P>) -> Self {
		Self {
			name: Some(name.into()),
			policies: policies.into_iter().collect(),
		}
	}

	/// Builder: append a child.
	pub fn with_policy(mut self, policy: P) -> Self {
		self.policies.push(policy);
		self
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn policies(&self) -> &[P] {
		&self.policies
	}
}

impl<P: Evaluate> Evaluate for AnyOf<P> {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		let mut children = Vec::with_capacity(self.policies.len());
		for policy in &self.policies {
			let response = policy.evaluate(ctx)?;
			if response.is_granted() {
				return Ok(response);
			}
			children.extend(response.trace);
		}

		let trace =
			AccessEvaluationTrace::new(self.description(), Access::denied()).with_children(children);
		Ok(ctx.respond(Access::denied(), trace))
	}

	fn description(&self) -> String {
		describe("AnyOf", self.name())
	}
}

/// Inverts its child.
#[derive(Debug, Clone, PartialEq)]
pub struct Not<P> {
	name: Option<String>,
	policy: Box<P>,
}

impl<P> Not<P> {
	pub fn new(policy: P) -> Self {
		Self {
			name: None,
			policy: Box::new(policy),
		}
	}

	pub fn named(name: impl Into<String>, policy: P) -> Self {
		Self {
			name: Some(name.into()),
			policy: Box::new(policy),
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn policy(&self) -> &P {
		&self.policy
	}
}

impl<P: Evaluate> Evaluate for Not<P> {
	fn evaluate(&self, ctx: &EvaluationContext<'_>) -> EvaluationResult<AccessResponse> {
		let inner = self.policy.evaluate(ctx)?;
		let access = inner.access.negated();
		let trace = AccessEvaluationTrace::new(self.description(), access.clone())
			.with_children(inner.trace.into_iter().collect());
		Ok(ctx.respond(access, trace))
	}

	fn description(&self) -> String {
		describe("Not", self.name())
	}
}
