// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Evaluation traces.
//!
//! A trace is a tree that mirrors the part of the policy tree that decided the
//! outcome. Nodes that forward a child's response verbatim (a short-circuiting
//! `AllOf`/`AnyOf`, or `ForAllMembers` on the first denial) forward that child's
//! trace as-is instead of wrapping it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::access::Access;

/// One node of an evaluation trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEvaluationTrace {
	pub policy_description: String,
	pub access: Access,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub note: Option<String>,
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub children: Vec<AccessEvaluationTrace>,
}

impl AccessEvaluationTrace {
	pub fn new(policy_description: impl Into<String>, access: Access) -> Self {
		Self {
			policy_description: policy_description.into(),
			access,
			note: None,
			children: Vec::new(),
		}
	}

	/// Builder: set the note.
	pub fn with_note(mut self, note: impl Into<String>) -> Self {
		self.note = Some(note.into());
		self
	}

	/// Builder: set the children.
	pub fn with_children(mut self, children: Vec<AccessEvaluationTrace>) -> Self {
		self.children = children;
		self
	}

	/// Number of nodes in this subtree, including this one.
	pub fn node_count(&self) -> usize {
		1 + self
			.children
			.iter()
			.map(AccessEvaluationTrace::node_count)
			.sum::<usize>()
	}

	/// Length of the longest root-to-leaf path.
	pub fn depth(&self) -> usize {
		1 + self
			.children
			.iter()
			.map(AccessEvaluationTrace::depth)
			.max()
			.unwrap_or(0)
	}

	/// Depth-first search for the first node whose note is set.
	pub fn first_note(&self) -> Option<&str> {
		self.note.as_deref().or_else(|| {
			self
				.children
				.iter()
				.find_map(AccessEvaluationTrace::first_note)
		})
	}

	fn render(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
		write!(
			f,
			"{:width$}{} => {}",
			"",
			self.policy_description,
			self.access,
			width = indent * 2
		)?;
		if let Some(note) = &self.note {
			write!(f, " ({note})")?;
		}
		writeln!(f)?;
		for child in &self.children {
			child.render(f, indent + 1)?;
		}
		Ok(())
	}
}

/// Renders the tree one node per line, children indented by two spaces.
impl fmt::Display for AccessEvaluationTrace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.render(f, 0)
	}
}

/// `Kind` or `Kind(name=<name>)`.
pub(crate) fn describe(kind: &str, name: Option<&str>) -> String {
	match name {
		Some(name) => format!("{kind}(name={name})"),
		None => kind.to_string(),
	}
}
