// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test fixtures for crates that depend on `automaker-core` with the
//! `test-support` feature enabled.

use crate::feature::{Feature, FeatureId, FeatureStatus};

/// A minimal feature with the given id and status, for tests that only
/// care about scheduling/ordering behavior.
pub fn stub_feature(id: &str, status: FeatureStatus) -> Feature {
    Feature {
        id: FeatureId::new(id),
        category: "Core".into(),
        description: format!("stub feature {id}"),
        steps: Vec::new(),
        status,
        skip_tests: false,
        model: "claude-sonnet-4-5".into(),
        thinking_level: crate::feature::ThinkingLevel::None,
        image_paths: Vec::new(),
        branch_name: None,
        worktree_path: None,
        priority: 999,
        dependencies: Default::default(),
        started_at: None,
        just_finished_at: None,
        extra: serde_json::Map::new(),
    }
}
