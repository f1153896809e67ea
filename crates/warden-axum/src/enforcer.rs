// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Handler-side access to the enforcement point.

use std::sync::{
	atomic::{AtomicU8, Ordering},
	Arc,
};

use axum::extract::FromRequestParts;
use http::{request::Parts, StatusCode};
use tracing::{debug, warn};
use warden_config::EnforcementConfig;
use warden_core::{AccessRequest, AccessResponse, EnforcementPoint, FilterAccessRequest};

use crate::response::{AccessDenied, MissingEnforcer};

/// Whether the current call has consulted the enforcement point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum EnforcementState {
	Pending = 0,
	Enforced = 1,
	Ignored = 2,
}

impl EnforcementState {
	fn from_u8(value: u8) -> Self {
		match value {
			1 => Self::Enforced,
			2 => Self::Ignored,
			_ => Self::Pending,
		}
	}
}

/// Per-call handle to the enforcement point, inserted into request extensions by
/// [`RequireEnforcement`](crate::RequireEnforcement).
///
/// Handlers must either [`enforce`](Self::enforce) or [`ignore`](Self::ignore)
/// before returning; otherwise the layer replaces their response.
///
/// ```ignore
/// async fn show(enforcer: Enforcer, Path(id): Path<String>) -> Result<String, AccessDenied> {
///     let request = AccessRequest::new().with_resource("id", id.clone());
///     enforcer.enforce(request)?;
///     Ok(id)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Enforcer {
	point: EnforcementPoint,
	config: Arc<EnforcementConfig>,
	state: Arc<AtomicU8>,
}

impl Enforcer {
	pub(crate) fn new(point: EnforcementPoint, config: Arc<EnforcementConfig>) -> Self {
		Self {
			point,
			config,
			state: Arc::new(AtomicU8::new(EnforcementState::Pending as u8)),
		}
	}

	/// Evaluates `request` and marks the call as enforced, whatever the outcome.
	pub fn enforce(
		&self,
		request: impl Into<Arc<AccessRequest>>,
	) -> Result<AccessResponse, AccessDenied> {
		self.mark(EnforcementState::Enforced);
		self.point.enforce_authorization(request).map_err(|denied| {
			let properties = self
				.config
				.expose_denial_properties
				.then(|| denied.properties().clone())
				.filter(|p| !p.is_empty());
			let trace = denied.into_response().trace;
			AccessDenied::new(self.denied_status(), properties, trace)
		})
	}

	/// Marks the call as deliberately not enforced.
	pub fn ignore(&self) {
		debug!("enforcement explicitly ignored");
		self.mark(EnforcementState::Ignored);
	}

	/// The granted resources of `request`. Marks the call as enforced.
	pub fn filter_authorized<R>(&self, request: FilterAccessRequest<R>) -> Vec<R> {
		self.mark(EnforcementState::Enforced);
		self.point.filter_authorized(request)
	}

	pub fn state(&self) -> EnforcementState {
		EnforcementState::from_u8(self.state.load(Ordering::Acquire))
	}

	pub fn is_enforced(&self) -> bool {
		self.state() == EnforcementState::Enforced
	}

	pub fn point(&self) -> &EnforcementPoint {
		&self.point
	}

	fn mark(&self, state: EnforcementState) {
		self.state.store(state as u8, Ordering::Release);
	}

	fn denied_status(&self) -> StatusCode {
		StatusCode::from_u16(self.config.denied_status).unwrap_or(StatusCode::FORBIDDEN)
	}
}

impl<S> FromRequestParts<S> for Enforcer
where
	S: Send + Sync,
{
	type Rejection = MissingEnforcer;

	async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
		parts.extensions.get::<Enforcer>().cloned().ok_or_else(|| {
			warn!(path = %parts.uri.path(), "Enforcer requested without the enforcement layer");
			MissingEnforcer
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;
	use warden_core::{Access, ConstantPolicy, Policy};

	fn enforcer(access: Access, config: EnforcementConfig) -> Enforcer {
		let point = EnforcementPoint::new(Policy::from(ConstantPolicy::new(access)))
			.with_trace(config.include_trace);
		Enforcer::new(point, Arc::new(config))
	}

	#[test]
	fn starts_pending() {
		let enforcer = enforcer(Access::granted(), EnforcementConfig::default());
		assert_eq!(enforcer.state(), EnforcementState::Pending);
		assert!(!enforcer.is_enforced());
	}

	#[test]
	fn enforce_marks_enforced_on_grant() {
		let enforcer = enforcer(Access::granted(), EnforcementConfig::default());
		assert!(enforcer.enforce(AccessRequest::new()).is_ok());
		assert!(enforcer.is_enforced());
	}

	#[test]
	fn enforce_marks_enforced_on_denial() {
		let enforcer = enforcer(Access::denied(), EnforcementConfig::default());
		let denied = enforcer.enforce(AccessRequest::new()).unwrap_err();
		assert_eq!(denied.status(), StatusCode::FORBIDDEN);
		assert!(enforcer.is_enforced());
	}

	#[test]
	fn ignore_marks_ignored() {
		let enforcer = enforcer(Access::granted(), EnforcementConfig::default());
		enforcer.ignore();
		assert_eq!(enforcer.state(), EnforcementState::Ignored);
	}

	#[test]
	fn clones_share_state() {
		let enforcer = enforcer(Access::granted(), EnforcementConfig::default());
		let clone = enforcer.clone();
		clone.ignore();
		assert_eq!(enforcer.state(), EnforcementState::Ignored);
	}

	#[test]
	fn properties_hidden_unless_exposed() {
		let hidden = enforcer(
			Access::denied_because("suspended"),
			EnforcementConfig::default(),
		);
		let denied = hidden.enforce(AccessRequest::new()).unwrap_err();
		assert!(denied.body().properties.is_none());

		let exposed = enforcer(
			Access::denied_because("suspended"),
			EnforcementConfig {
				expose_denial_properties: true,
				..Default::default()
			},
		);
		let denied = exposed.enforce(AccessRequest::new()).unwrap_err();
		let properties = denied.body().properties.as_ref().unwrap();
		assert_eq!(properties["reason"], json!("suspended"));
	}

	#[test]
	fn trace_follows_config() {
		let without = enforcer(Access::denied(), EnforcementConfig::default());
		let denied = without.enforce(AccessRequest::new()).unwrap_err();
		assert!(denied.body().trace.is_none());

		let with = enforcer(
			Access::denied(),
			EnforcementConfig {
				include_trace: true,
				..Default::default()
			},
		);
		let denied = with.enforce(AccessRequest::new()).unwrap_err();
		let trace = denied.body().trace.as_ref().unwrap();
		assert_eq!(trace.policy_description, "ConstantPolicy");
	}

	#[test]
	fn custom_denied_status() {
		let enforcer = enforcer(
			Access::denied(),
			EnforcementConfig {
				denied_status: 404,
				..Default::default()
			},
		);
		let denied = enforcer.enforce(AccessRequest::new()).unwrap_err();
		assert_eq!(denied.status(), StatusCode::NOT_FOUND);
	}
}
