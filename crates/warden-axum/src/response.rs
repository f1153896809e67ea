// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP renderings of enforcement outcomes.

use axum::{
	response::{IntoResponse, Response},
	Json,
};
use http::StatusCode;
use serde::Serialize;
use warden_core::{AccessEvaluationTrace, Properties};

/// Body sent when a handler returns without enforcing or ignoring Warden.
pub const NOT_ENFORCED_MESSAGE: &str = "Not Authorized: EnforcementPoint not enforced";

/// JSON body of a denial.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeniedBody {
	/// Error code, always "forbidden"
	pub error: String,
	/// Human-readable message
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub properties: Option<Properties>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub trace: Option<AccessEvaluationTrace>,
}

/// The policy denied the request. Returned by
/// [`Enforcer::enforce`](crate::Enforcer::enforce) so handlers can use `?`.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("access denied")]
pub struct AccessDenied {
	status: StatusCode,
	body: DeniedBody,
}

impl AccessDenied {
	pub(crate) fn new(
		status: StatusCode,
		properties: Option<Properties>,
		trace: Option<AccessEvaluationTrace>,
	) -> Self {
		Self {
			status,
			body: DeniedBody {
				error: "forbidden".to_string(),
				message: "Not Authorized".to_string(),
				properties,
				trace,
			},
		}
	}

	pub fn status(&self) -> StatusCode {
		self.status
	}

	pub fn body(&self) -> &DeniedBody {
		&self.body
	}
}

impl IntoResponse for AccessDenied {
	fn into_response(self) -> Response {
		(self.status, Json(self.body)).into_response()
	}
}

/// The [`Enforcer`](crate::Enforcer) extractor was used on a route without the
/// [`RequireEnforcement`](crate::RequireEnforcement) layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("Warden enforcement layer is not installed")]
pub struct MissingEnforcer;

impl IntoResponse for MissingEnforcer {
	fn into_response(self) -> Response {
		(StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
	}
}

pub(crate) fn not_enforced_response(status: StatusCode) -> Response {
	(status, NOT_ENFORCED_MESSAGE).into_response()
}
