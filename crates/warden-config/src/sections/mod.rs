// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

mod enforcement;

pub use enforcement::{
	EnforcementConfig, EnforcementConfigLayer, DEFAULT_DENIED_STATUS, DEFAULT_NOT_ENFORCED_STATUS,
};
