// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Attribute-based access control for Warden.
//!
//! Policies are assembled once as an immutable tree and evaluated per request. A
//! request carries four attribute groups (subject, action, resource, environment)
//! and every evaluation produces a `Granted` or `Denied` [`Access`] plus a trace
//! explaining the decision.
//!
//! # Overview
//!
//! - [`AllOf`], [`AnyOf`], [`Not`] compose policies and short-circuit on the first
//!   decisive child
//! - [`ForAnyMemberPolicy`] and [`ForAllMembersPolicy`] quantify [`MemberPolicy`]
//!   predicates over a collection attribute
//! - [`ExpressionPolicy`] compares resolved values with an [`Operator`]
//! - [`EnforcementPoint`] turns a denial into a [`NotAuthorized`] error
//!
//! Evaluation fails closed: a missing attribute, a malformed collection or an
//! incomparable operand denies, and the trace note records why.
//!
//! # Example
//!
//! ```
//! use warden_core::{
//!     AccessRequest, ExpressionPolicy, ForAnyMemberPolicy, MemberExpressionPolicy, MemberPolicy,
//!     Operator, Policy, ValueReference,
//! };
//! use serde_json::json;
//!
//! let same_user =
//!     MemberExpressionPolicy::new("user", Operator::Equal, ValueReference::subject("id").unwrap())
//!         .unwrap();
//! let is_member = ForAnyMemberPolicy::new(
//!     ValueReference::resource("members").unwrap(),
//!     [MemberPolicy::from(same_user)],
//! )
//! .unwrap();
//!
//! let reads = ExpressionPolicy::new(
//!     ValueReference::action("type").unwrap(),
//!     Operator::Equal,
//!     ValueReference::literal("read"),
//! )
//! .unwrap();
//!
//! let can_read = Policy::all_of([Policy::from(reads), Policy::from(is_member)]);
//!
//! let request = AccessRequest::new()
//!     .with_subject("id", "alice")
//!     .with_action("type", "read")
//!     .with_resource("members", json!([{"user": "alice"}]));
//!
//! assert!(can_read.check_authorized(request).is_granted());
//! ```

pub mod access;
pub mod attributes;
pub mod batch;
pub mod context;
pub mod convert;
pub mod enforcement;
pub mod error;
pub mod operator;
pub mod policy;
pub mod trace;

pub use access::{Access, AccessRequest, AccessResponse, Attributes, Properties};
pub use attributes::{AttributeGroup, AttributePath, ValueReference};
pub use batch::{AccessRequestBatch, FilterAccessRequest, ResourceAttributePair};
pub use context::EvaluationContext;
pub use convert::{to_attributes, AttributeType};
pub use enforcement::{EnforcementPoint, NotAuthorized};
pub use error::{AttributeConversionError, EvaluationError, EvaluationResult, PolicyBuildError};
pub use operator::Operator;
pub use policy::{
	AllOf, AnyOf, ConstantPolicy, Evaluate, ExpressionPolicy, ForAllMembersPolicy,
	ForAnyMemberPolicy, MemberExpressionPolicy, MemberPolicy, Not, Policy,
};
pub use trace::AccessEvaluationTrace;
