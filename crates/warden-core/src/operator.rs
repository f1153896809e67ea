// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Comparison operators for expression policies.

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

use crate::attributes::value_kind;
use crate::error::{EvaluationError, EvaluationResult};

/// Operators for expression policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
	Equal,
	NotEqual,
	GreaterThan,
	GreaterThanOrEqual,
	LessThan,
	LessThanOrEqual,
	/// Left is an element of the right-hand array.
	IsIn,
	IsNotIn,
	/// Left string contains right string, or left array contains right value.
	Contains,
	/// Every element of the right-hand array is in the left-hand array.
	ContainsAll,
	/// At least one element of the right-hand array is in the left-hand array.
	ContainsAny,
	StartsWith,
	EndsWith,
	/// Unary: the left path resolves to a non-null value.
	Exists,
}

impl Operator {
	/// Returns true for operators that ignore the right operand.
	pub fn is_unary(&self) -> bool {
		matches!(self, Operator::Exists)
	}

	/// Evaluates this operator against two resolved values.
	///
	/// Returns [`EvaluationError::Incomparable`] when the operator has no meaning for
	/// the operand types, e.g. ordering a string against a number.
	pub fn evaluate(&self, left: &Value, right: &Value) -> EvaluationResult<bool> {
		match self {
			Operator::Equal => Ok(values_equal(left, right)),
			Operator::NotEqual => Ok(!values_equal(left, right)),
			Operator::GreaterThan => self.order(left, right).map(Ordering::is_gt),
			Operator::GreaterThanOrEqual => self.order(left, right).map(Ordering::is_ge),
			Operator::LessThan => self.order(left, right).map(Ordering::is_lt),
			Operator::LessThanOrEqual => self.order(left, right).map(Ordering::is_le),
			Operator::IsIn => self.array(right, left).map(|items| contains(items, left)),
			Operator::IsNotIn => self.array(right, left).map(|items| !contains(items, left)),
			Operator::Contains => match (left, right) {
				(Value::String(haystack), Value::String(needle)) => Ok(haystack.contains(needle.as_str())),
				(Value::Array(items), needle) => Ok(contains(items, needle)),
				_ => Err(self.incomparable(left, right)),
			},
			Operator::ContainsAll => {
				let (items, wanted) = self.arrays(left, right)?;
				Ok(wanted.iter().all(|w| contains(items, w)))
			}
			Operator::ContainsAny => {
				let (items, wanted) = self.arrays(left, right)?;
				Ok(wanted.iter().any(|w| contains(items, w)))
			}
			Operator::StartsWith => match (left, right) {
				(Value::String(s), Value::String(prefix)) => Ok(s.starts_with(prefix.as_str())),
				_ => Err(self.incomparable(left, right)),
			},
			Operator::EndsWith => match (left, right) {
				(Value::String(s), Value::String(suffix)) => Ok(s.ends_with(suffix.as_str())),
				_ => Err(self.incomparable(left, right)),
			},
			Operator::Exists => Ok(!left.is_null()),
		}
	}

	fn order(&self, left: &Value, right: &Value) -> EvaluationResult<Ordering> {
		match (left, right) {
			(Value::Number(a), Value::Number(b)) => {
				compare_numbers(a, b).ok_or_else(|| self.incomparable(left, right))
			}
			(Value::String(a), Value::String(b)) => Ok(a.cmp(b)),
			_ => Err(self.incomparable(left, right)),
		}
	}

	/// `collection` must be an array; `other` only names the second kind on failure.
	fn array<'v>(&self, collection: &'v Value, other: &Value) -> EvaluationResult<&'v [Value]> {
		collection
			.as_array()
			.map(Vec::as_slice)
			.ok_or_else(|| self.incomparable(other, collection))
	}

	fn arrays<'v>(
		&self,
		left: &'v Value,
		right: &'v Value,
	) -> EvaluationResult<(&'v [Value], &'v [Value])> {
		match (left, right) {
			(Value::Array(a), Value::Array(b)) => Ok((a, b)),
			_ => Err(self.incomparable(left, right)),
		}
	}

	fn incomparable(&self, left: &Value, right: &Value) -> EvaluationError {
		EvaluationError::Incomparable {
			operator: *self,
			left: value_kind(left),
			right: value_kind(right),
		}
	}
}

impl fmt::Display for Operator {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let s = match self {
			Operator::Equal => "==",
			Operator::NotEqual => "!=",
			Operator::GreaterThan => ">",
			Operator::GreaterThanOrEqual => ">=",
			Operator::LessThan => "<",
			Operator::LessThanOrEqual => "<=",
			Operator::IsIn => "in",
			Operator::IsNotIn => "not in",
			Operator::Contains => "contains",
			Operator::ContainsAll => "contains all",
			Operator::ContainsAny => "contains any",
			Operator::StartsWith => "starts with",
			Operator::EndsWith => "ends with",
			Operator::Exists => "exists",
		};
		write!(f, "{s}")
	}
}

/// Structural equality, except numbers compare by value so `1 == 1.0`.
fn values_equal(a: &Value, b: &Value) -> bool {
	match (a, b) {
		(Value::Number(x), Value::Number(y)) => compare_numbers(x, y) == Some(Ordering::Equal),
		(Value::Array(xs), Value::Array(ys)) => {
			xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
		}
		(Value::Object(xs), Value::Object(ys)) => {
			xs.len() == ys.len()
				&& xs
					.iter()
					.all(|(k, x)| ys.get(k).is_some_and(|y| values_equal(x, y)))
		}
		_ => a == b,
	}
}

/// Integers compare exactly; `f64` is only used when either side is a float.
fn compare_numbers(a: &Number, b: &Number) -> Option<Ordering> {
	match (integer(a), integer(b)) {
		(Some(a), Some(b)) => Some(a.cmp(&b)),
		_ => a.as_f64()?.partial_cmp(&b.as_f64()?),
	}
}

fn integer(n: &Number) -> Option<i128> {
	n.as_i64()
		.map(i128::from)
		.or_else(|| n.as_u64().map(i128::from))
}

fn contains(items: &[Value], needle: &Value) -> bool {
	items.iter().any(|item| values_equal(item, needle))
}
