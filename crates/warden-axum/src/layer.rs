// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Route layer that refuses to let a response through unless the handler
//! consulted the enforcement point.

use std::{
	future::Future,
	pin::Pin,
	sync::Arc,
	task::{ready, Context, Poll},
};

use axum::{
	body::Body,
	http::{Method, Request, StatusCode},
	response::Response,
};
use pin_project_lite::pin_project;
use tower::{Layer, Service};
use tracing::{trace, warn};
use warden_config::EnforcementConfig;
use warden_core::{EnforcementPoint, Evaluate, Policy};

use crate::enforcer::{EnforcementState, Enforcer};
use crate::response::not_enforced_response;

/// Installs an [`Enforcer`] for every request and rejects responses from
/// handlers that neither enforced nor ignored it.
///
/// # Example
///
/// ```ignore
/// let config = warden_config::load_config()?.enforcement;
/// Router::new()
///     .route("/documents/{id}", get(show))
///     .layer(RequireEnforcement::new(policy, config));
/// ```
#[derive(Debug, Clone)]
pub struct RequireEnforcement {
	point: EnforcementPoint,
	config: Arc<EnforcementConfig>,
}

impl RequireEnforcement {
	/// Traces are kept on responses only when `config.include_trace` is set.
	pub fn new(policy: impl Into<Arc<Policy>>, config: EnforcementConfig) -> Self {
		let point = EnforcementPoint::new(policy).with_trace(config.include_trace);
		Self {
			point,
			config: Arc::new(config),
		}
	}

	pub fn config(&self) -> &EnforcementConfig {
		&self.config
	}
}

impl<S> Layer<S> for RequireEnforcement {
	type Service = RequireEnforcementService<S>;

	fn layer(&self, inner: S) -> Self::Service {
		RequireEnforcementService {
			inner,
			point: self.point.clone(),
			config: self.config.clone(),
		}
	}
}

/// Service wrapper for [`RequireEnforcement`] layer.
#[derive(Debug, Clone)]
pub struct RequireEnforcementService<S> {
	inner: S,
	point: EnforcementPoint,
	config: Arc<EnforcementConfig>,
}

impl<S> Service<Request<Body>> for RequireEnforcementService<S>
where
	S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
	S::Future: Send,
{
	type Response = Response;
	type Error = S::Error;
	type Future = RequireEnforcementFuture<S::Future>;

	fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
		self.inner.poll_ready(cx)
	}

	fn call(&mut self, mut req: Request<Body>) -> Self::Future {
		let method = req.method().clone();
		let path = req.uri().path().to_string();
		let exempt = self.config.is_exempt(&path);
		let enforcer = Enforcer::new(self.point.clone(), self.config.clone());
		req.extensions_mut().insert(enforcer.clone());

		trace!(
			method = %method,
			path = %path,
			exempt,
			policy = %self.point.policy().description(),
			"enforcement installed"
		);

		RequireEnforcementFuture {
			inner: self.inner.call(req),
			enforcer,
			exempt,
			method,
			path,
			not_enforced_status: StatusCode::from_u16(self.config.not_enforced_status)
				.unwrap_or(StatusCode::UNAUTHORIZED),
		}
	}
}

pin_project! {
	/// Future for [`RequireEnforcementService`].
	pub struct RequireEnforcementFuture<F> {
		#[pin]
		inner: F,
		enforcer: Enforcer,
		exempt: bool,
		method: Method,
		path: String,
		not_enforced_status: StatusCode,
	}
}

impl<F, E> Future for RequireEnforcementFuture<F>
where
	F: Future<Output = Result<Response, E>>,
{
	type Output = Result<Response, E>;

	fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		let this = self.project();
		let response = ready!(this.inner.poll(cx))?;

		if *this.exempt || this.enforcer.state() != EnforcementState::Pending {
			return Poll::Ready(Ok(response));
		}

		warn!(
			method = %this.method,
			path = %this.path,
			status = response.status().as_u16(),
			"handler returned without enforcing authorization"
		);
		Poll::Ready(Ok(not_enforced_response(*this.not_enforced_status)))
	}
}
