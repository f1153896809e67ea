// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-process enforcement.
//!
//! [`EnforcementPoint`] turns a `Denied` outcome into an error so callers can use
//! `?` at the point where a decision must be honoured.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, instrument};

use crate::access::{AccessRequest, AccessResponse, Properties};
use crate::batch::FilterAccessRequest;
use crate::policy::{Evaluate, Policy};

/// The policy denied the request.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("not authorized")]
pub struct NotAuthorized {
	response: Box<AccessResponse>,
}

impl NotAuthorized {
	pub fn new(response: AccessResponse) -> Self {
		Self {
			response: Box::new(response),
		}
	}

	/// The denying response.
	pub fn response(&self) -> &AccessResponse {
		&self.response
	}

	/// Properties of the denial, e.g. a `reason`.
	pub fn properties(&self) -> &Properties {
		self.response.access.properties()
	}

	pub fn into_response(self) -> AccessResponse {
		*self.response
	}
}

/// A shared policy tree plus how its responses are returned.
#[derive(Debug, Clone)]
pub struct EnforcementPoint {
	policy: Arc<Policy>,
	include_trace: bool,
}

impl EnforcementPoint {
	/// Traces are included by default.
	pub fn new(policy: impl Into<Arc<Policy>>) -> Self {
		Self {
			policy: policy.into(),
			include_trace: true,
		}
	}

	/// Builder: keep or strip traces on returned responses.
	pub fn with_trace(mut self, include_trace: bool) -> Self {
		self.include_trace = include_trace;
		self
	}

	pub fn policy(&self) -> &Arc<Policy> {
		&self.policy
	}

	pub fn includes_trace(&self) -> bool {
		self.include_trace
	}

	/// Evaluates `request` without judging the outcome.
	pub fn check_authorized(&self, request: impl Into<Arc<AccessRequest>>) -> AccessResponse {
		self.shape(self.policy.check_authorized(request))
	}

	/// Evaluates `request` and converts a denial into [`NotAuthorized`].
	#[instrument(level = "debug", skip_all, fields(policy = %self.policy.description()))]
	pub fn enforce_authorization(
		&self,
		request: impl Into<Arc<AccessRequest>>,
	) -> Result<AccessResponse, NotAuthorized> {
		let response = self.check_authorized(request);
		if response.is_denied() {
			info!(
				properties = ?response.access.properties(),
				"access denied"
			);
			return Err(NotAuthorized::new(response));
		}

		debug!("access granted");
		Ok(response)
	}

	/// The resources of `request` that were granted.
	pub fn filter_authorized<R>(&self, request: FilterAccessRequest<R>) -> Vec<R> {
		self.policy.filter_authorized(request)
	}

	fn shape(&self, response: AccessResponse) -> AccessResponse {
		if self.include_trace {
			response
		} else {
			response.without_trace()
		}
	}
}
