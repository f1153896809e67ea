// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Error types for policy construction and evaluation.
//!
//! Two families exist and they never mix:
//!
//! - [`PolicyBuildError`] is returned while a policy tree is being assembled. A tree
//!   that fails to build never exists, so it can never misbehave at request time.
//! - [`EvaluationError`] describes why a value could not be resolved or compared
//!   during evaluation. It never escapes a [`Policy`](crate::Policy): the nearest
//!   enclosing policy converts it into a `Denied` response and records the rendered
//!   error as the trace note.

use thiserror::Error;

use crate::operator::Operator;

/// Result type alias for evaluation steps that may fail closed.
pub type EvaluationResult<T> = Result<T, EvaluationError>;

/// Conditions that make a policy deny instead of deciding on the merits.
///
/// The `Display` output is what ends up in
/// [`AccessEvaluationTrace::note`](crate::AccessEvaluationTrace::note), so each
/// variant renders as `Kind: detail`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvaluationError {
	/// The member source is not a collection, or one of its elements is not an
	/// attribute map.
	#[error("InvalidMember: {0}")]
	InvalidMember(String),

	/// A path did not resolve. `segment` is the first key that was missing, or the
	/// key that was looked up inside a value that is not a map.
	#[error("NoSuchAttribute: {path} (failed at '{segment}')")]
	NoSuchAttribute { path: String, segment: String },

	/// The operator is not defined for the operand types.
	#[error("Incomparable: {operator} is not defined for {left} and {right}")]
	Incomparable {
		operator: Operator,
		left: &'static str,
		right: &'static str,
	},

	/// A member-scoped reference was resolved with no member bound.
	#[error("UnboundMember: {path} was resolved outside a member policy")]
	UnboundMember { path: String },
}

impl EvaluationError {
	/// Returns true if this error means "the attribute is absent".
	pub fn is_missing_attribute(&self) -> bool {
		matches!(self, EvaluationError::NoSuchAttribute { .. })
	}
}

/// Errors raised while assembling a policy tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyBuildError {
	#[error("member policies must not be empty")]
	EmptyMemberPolicies,

	#[error("attribute path must not be empty")]
	EmptyPath,

	#[error("attribute path contains an empty segment: '{0}'")]
	EmptySegment(String),

	#[error("member reference {0} can only be used inside a member policy")]
	MemberReferenceOutsideMemberScope(String),
}

/// A domain value could not be turned into an attribute map.
#[derive(Debug, Error)]
pub enum AttributeConversionError {
	#[error("failed to serialize attributes: {0}")]
	Serialize(#[from] serde_json::Error),

	#[error("attributes must serialize to a map, got a {0}")]
	NotAMap(&'static str),
}
