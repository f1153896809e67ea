// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Building attribute maps from domain values.
//!
//! Any `Serialize` type that serializes to a map can be used as an attribute
//! group, so `#[serde(skip)]` and `#[serde(rename)]` decide what a policy sees.
//! Nested structs and collections become nested maps and arrays.

use serde::Serialize;
use serde_json::Value;

use crate::access::Attributes;
use crate::attributes::value_kind;
use crate::error::AttributeConversionError;

/// Serializes `value` into an attribute map.
pub fn to_attributes<T: Serialize + ?Sized>(
	value: &T,
) -> Result<Attributes, AttributeConversionError> {
	match serde_json::to_value(value)? {
		Value::Object(map) => Ok(map),
		other => Err(AttributeConversionError::NotAMap(value_kind(&other))),
	}
}

/// Tags attributes with the kind of thing they describe, e.g. `{"type": "Document"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeType {
	keyword: String,
	name: String,
}

impl AttributeType {
	pub const DEFAULT_KEYWORD: &'static str = "type";

	pub fn new(name: impl Into<String>) -> Self {
		Self {
			keyword: Self::DEFAULT_KEYWORD.to_string(),
			name: name.into(),
		}
	}

	/// Builder: use a key other than `type`.
	pub fn with_keyword(mut self, keyword: impl Into<String>) -> Self {
		self.keyword = keyword.into();
		self
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn attributes(&self) -> Attributes {
		let mut attributes = Attributes::new();
		attributes.insert(self.keyword.clone(), Value::String(self.name.clone()));
		attributes
	}

	/// The type attribute plus `extra`. The type key wins on collision.
	pub fn with_attributes<I, K, V>(&self, extra: I) -> Attributes
	where
		I: IntoIterator<Item = (K, V)>,
		K: Into<String>,
		V: Into<Value>,
	{
		let mut attributes: Attributes = extra
			.into_iter()
			.map(|(k, v)| (k.into(), v.into()))
			.collect();
		attributes.extend(self.attributes());
		attributes
	}

	/// The type attribute merged with the serialized fields of `value`.
	pub fn describe<T: Serialize + ?Sized>(
		&self,
		value: &T,
	) -> Result<Attributes, AttributeConversionError> {
		let mut attributes = to_attributes(value)?;
		attributes.extend(self.attributes());
		Ok(attributes)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::access::AccessRequest;
	use crate::attributes::ValueReference;
	use crate::operator::Operator;
	use crate::policy::{ExpressionPolicy, Policy};
	use serde_json::json;
	use std::collections::BTreeMap;

	#[derive(Serialize)]
	struct Comment {
		author: String,
		#[serde(skip)]
		#[allow(dead_code)]
		draft_notes: String,
	}

	#[derive(Serialize)]
	struct Document {
		id: u64,
		owner: String,
		comments: Vec<Comment>,
		labels: BTreeMap<String, Comment>,
	}

	fn document() -> Document {
		let mut labels = BTreeMap::new();
		labels.insert(
			"pinned".to_string(),
			Comment {
				author: "carol".to_string(),
				draft_notes: "hidden".to_string(),
			},
		);
		Document {
			id: 7,
			owner: "alice".to_string(),
			comments: vec![Comment {
				author: "bob".to_string(),
				draft_notes: "hidden".to_string(),
			}],
			labels,
		}
	}

	#[test]
	fn nested_values_become_nested_attributes() {
		let attributes = to_attributes(&document()).unwrap();
		assert_eq!(
			Value::Object(attributes),
			json!({
				"id": 7,
				"owner": "alice",
				"comments": [{"author": "bob"}],
				"labels": {"pinned": {"author": "carol"}}
			})
		);
	}

	#[test]
	fn non_map_values_are_rejected() {
		match to_attributes(&vec![1, 2]) {
			Err(AttributeConversionError::NotAMap(kind)) => assert_eq!(kind, "array"),
			other => panic!("expected NotAMap, got {other:?}"),
		}
		assert!(to_attributes("owner").is_err());
	}

	#[test]
	fn type_attribute_uses_keyword() {
		let kind = AttributeType::new("SomeType").with_keyword("customType");
		assert_eq!(Value::Object(kind.attributes()), json!({"customType": "SomeType"}));
		assert_eq!(kind.name(), "SomeType");
	}

	#[test]
	fn with_attributes_keeps_the_type() {
		let kind = AttributeType::new("Document");
		let attributes = kind.with_attributes([("id", json!(3)), ("type", json!("Spoofed"))]);
		assert_eq!(
			Value::Object(attributes),
			json!({"id": 3, "type": "Document"})
		);
	}

	#[test]
	fn described_values_feed_policies() {
		let resource = AttributeType::new("Document").describe(&document()).unwrap();
		let request = AccessRequest::new()
			.with_subject("id", "alice")
			.with_resource_attributes(resource);

		let owner: Policy = ExpressionPolicy::new(
			ValueReference::subject("id").unwrap(),
			Operator::Equal,
			ValueReference::resource("owner").unwrap(),
		)
		.unwrap()
		.into();
		let is_document: Policy = ExpressionPolicy::new(
			ValueReference::resource("type").unwrap(),
			Operator::Equal,
			ValueReference::literal("Document"),
		)
		.unwrap()
		.into();

		assert!(Policy::all_of([owner, is_document])
			.check_authorized(request)
			.is_granted());
	}
}
