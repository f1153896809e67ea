// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! The per-call evaluation context.
//!
//! The member currently under evaluation travels with the request on the call
//! stack rather than being written into the policy tree, so a single tree can be
//! evaluated by any number of threads at once.

use std::sync::Arc;

use crate::access::{Access, AccessRequest, AccessResponse, Attributes};
use crate::trace::AccessEvaluationTrace;

/// The request being evaluated plus, inside a member policy, the bound member.
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
	request: &'a Arc<AccessRequest>,
	member: Option<&'a Attributes>,
}

impl<'a> EvaluationContext<'a> {
	/// A request-scoped context with no member bound.
	pub fn new(request: &'a Arc<AccessRequest>) -> Self {
		Self {
			request,
			member: None,
		}
	}

	/// A child context with `member` bound. The parent is left untouched.
	pub fn with_member(&self, member: &'a Attributes) -> Self {
		Self {
			request: self.request,
			member: Some(member),
		}
	}

	pub fn request(&self) -> &'a AccessRequest {
		self.request
	}

	pub fn member(&self) -> Option<&'a Attributes> {
		self.member
	}

	/// Builds a response for this context's request.
	pub(crate) fn respond(&self, access: Access, trace: AccessEvaluationTrace) -> AccessResponse {
		AccessResponse::new(access, Arc::clone(self.request)).with_trace(trace)
	}
}
