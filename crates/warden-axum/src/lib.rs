// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! HTTP enforcement for axum services.
//!
//! Two pieces work together:
//!
//! - [`RequireEnforcement`] - a tower layer that gives every request an
//!   [`Enforcer`] and replaces the response of any handler that returned without
//!   consulting it (default `401 Not Authorized: EnforcementPoint not enforced`).
//! - [`Enforcer`] - an extractor handlers use to [`enforce`](Enforcer::enforce) a
//!   request against the policy, or [`ignore`](Enforcer::ignore) enforcement for
//!   a call that is deliberately public.
//!
//! Paths listed in [`EnforcementConfig::exempt_paths`](warden_config::EnforcementConfig)
//! pass through untouched.
//!
//! # Example
//!
//! ```ignore
//! use axum::{routing::get, Router};
//! use warden_axum::{AccessDenied, Enforcer, RequireEnforcement};
//! use warden_core::{AccessRequest, Policy};
//!
//! async fn report(enforcer: Enforcer) -> Result<&'static str, AccessDenied> {
//!     enforcer.enforce(AccessRequest::new().with_action("name", "read"))?;
//!     Ok("quarterly numbers")
//! }
//!
//! async fn health(enforcer: Enforcer) -> &'static str {
//!     enforcer.ignore();
//!     "ok"
//! }
//!
//! let app = Router::new()
//!     .route("/report", get(report))
//!     .route("/health", get(health))
//!     .layer(RequireEnforcement::new(policy, config.enforcement));
//! ```

pub mod enforcer;
pub mod layer;
pub mod response;

pub use enforcer::{EnforcementState, Enforcer};
pub use layer::{RequireEnforcement, RequireEnforcementFuture, RequireEnforcementService};
pub use response::{AccessDenied, DeniedBody, MissingEnforcer, NOT_ENFORCED_MESSAGE};
