// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! One subject, many resources.
//!
//! Both request kinds share a subject, action and environment and carry one
//! attribute map per resource. Evaluation builds a full [`AccessRequest`] per
//! resource and runs the same policy tree against each, in order.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::access::{AccessRequest, AccessResponse, Attributes};
use crate::policy::Policy;

/// Evaluate several resources, keeping every response.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccessRequestBatch {
	#[serde(default)]
	pub subject: Attributes,
	#[serde(default)]
	pub action: Attributes,
	#[serde(default)]
	pub resources: Vec<Attributes>,
	#[serde(default)]
	pub environment: Attributes,
}

impl AccessRequestBatch {
	/// The per-resource requests, in resource order.
	pub fn requests(&self) -> impl Iterator<Item = AccessRequest> + '_ {
		self.resources.iter().map(|resource| AccessRequest {
			subject: self.subject.clone(),
			action: self.action.clone(),
			resource: resource.clone(),
			environment: self.environment.clone(),
		})
	}
}

/// A caller-side resource value paired with the attributes policies see.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceAttributePair<R> {
	pub resource: R,
	pub attributes: Attributes,
}

impl<R> ResourceAttributePair<R> {
	pub fn new(resource: R, attributes: Attributes) -> Self {
		Self {
			resource,
			attributes,
		}
	}
}

/// Evaluate several resources, keeping only the granted ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterAccessRequest<R> {
	#[serde(default)]
	pub subject: Attributes,
	#[serde(default)]
	pub action: Attributes,
	pub resources: Vec<ResourceAttributePair<R>>,
	#[serde(default)]
	pub environment: Attributes,
}

impl<R> FilterAccessRequest<R> {
	pub fn new(resources: Vec<ResourceAttributePair<R>>) -> Self {
		Self {
			subject: Attributes::new(),
			action: Attributes::new(),
			resources,
			environment: Attributes::new(),
		}
	}

	/// Builder: replace the subject group.
	pub fn with_subject(mut self, subject: Attributes) -> Self {
		self.subject = subject;
		self
	}

	/// Builder: replace the action group.
	pub fn with_action(mut self, action: Attributes) -> Self {
		self.action = action;
		self
	}

	/// Builder: replace the environment group.
	pub fn with_environment(mut self, environment: Attributes) -> Self {
		self.environment = environment;
		self
	}
}

impl Policy {
	/// One response per resource in `batch`, in order.
	pub fn check_authorized_batch(&self, batch: &AccessRequestBatch) -> Vec<AccessResponse> {
		batch
			.requests()
			.map(|request| self.check_authorized(request))
			.collect()
	}

	/// The resources of `request` whose attributes were granted, in order.
	pub fn filter_authorized<R>(&self, request: FilterAccessRequest<R>) -> Vec<R> {
		let FilterAccessRequest {
			subject,
			action,
			resources,
			environment,
		} = request;
		let total = resources.len();

		let granted: Vec<R> = resources
			.into_iter()
			.filter_map(|pair| {
				let request = AccessRequest {
					subject: subject.clone(),
					action: action.clone(),
					resource: pair.attributes,
					environment: environment.clone(),
				};
				self.check_authorized(request)
					.is_granted()
					.then_some(pair.resource)
			})
			.collect();

		debug!(total, granted = granted.len(), "filtered resources");
		granted
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::attributes::ValueReference;
	use crate::operator::Operator;
	use crate::policy::ExpressionPolicy;
	use serde_json::json;

	fn owner_policy() -> Policy {
		ExpressionPolicy::new(
			ValueReference::subject("id").unwrap(),
			Operator::Equal,
			ValueReference::resource("owner").unwrap(),
		)
		.unwrap()
		.into()
	}

	fn attrs(value: serde_json::Value) -> Attributes {
		value.as_object().cloned().unwrap()
	}

	#[test]
	fn batch_returns_one_response_per_resource() {
		let batch = AccessRequestBatch {
			subject: attrs(json!({"id": "alice"})),
			resources: vec![
				attrs(json!({"owner": "alice"})),
				attrs(json!({"owner": "bob"})),
				attrs(json!({})),
			],
			..Default::default()
		};

		let responses = owner_policy().check_authorized_batch(&batch);
		let outcomes: Vec<bool> = responses.iter().map(AccessResponse::is_granted).collect();
		assert_eq!(outcomes, [true, false, false]);
		assert_eq!(responses[1].request.resource["owner"], json!("bob"));
	}

	#[test]
	fn empty_batch_is_empty() {
		let responses = owner_policy().check_authorized_batch(&AccessRequestBatch::default());
		assert!(responses.is_empty());
	}

	#[test]
	fn filter_keeps_granted_resources_in_order() {
		let request = FilterAccessRequest::new(vec![
			ResourceAttributePair::new("doc-1", attrs(json!({"owner": "alice"}))),
			ResourceAttributePair::new("doc-2", attrs(json!({"owner": "bob"}))),
			ResourceAttributePair::new("doc-3", attrs(json!({"owner": "alice"}))),
		])
		.with_subject(attrs(json!({"id": "alice"})));

		assert_eq!(owner_policy().filter_authorized(request), ["doc-1", "doc-3"]);
	}

	#[test]
	fn batch_deserializes_with_defaults() {
		let batch: AccessRequestBatch =
			serde_json::from_value(json!({"resources": [{"id": 1}, {"id": 2}]})).unwrap();
		assert_eq!(batch.requests().count(), 2);
		assert!(batch.subject.is_empty());
	}
}
