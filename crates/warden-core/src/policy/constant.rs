// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use crate::access::{Access, AccessResponse};
use crate::context::EvaluationContext;
use crate::trace::{describe, AccessEvaluationTrace};

/// A leaf that always returns the same [`Access`], properties included.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantPolicy {
	name: Option<String>,
	access: Access,
}

impl ConstantPolicy {
	pub fn new(access: Access) -> Self {
		Self { name: None, access }
	}

	pub fn named(name: impl Into<String>, access: Access) -> Self {
		Self {
			name: Some(name.into()),
			access,
		}
	}

	pub fn name(&self) -> Option<&str> {
		self.name.as_deref()
	}

	pub fn access(&self) -> &Access {
		&self.access
	}

	pub fn description(&self) -> String {
		describe("ConstantPolicy", self.name())
	}

	pub(crate) fn decide(&self, ctx: &EvaluationContext<'_>) -> AccessResponse {
		let trace = AccessEvaluationTrace::new(self.description(), self.access.clone());
		ctx.respond(self.access.clone(), trace)
	}
}
