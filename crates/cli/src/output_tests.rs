// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::FeatureId;
use automaker_engine::RunningFeature;

#[test]
fn empty_snapshot_prints_without_panicking() {
    let snapshot = Snapshot { running: Vec::new(), max_concurrency: 1, loop_running: Default::default() };
    print_status(&snapshot, OutputFormat::Text);
    print_status(&snapshot, OutputFormat::Json);
}

#[test]
fn snapshot_with_running_feature_prints_without_panicking() {
    let snapshot = Snapshot {
        running: vec![RunningFeature {
            feature_id: FeatureId::new("f1"),
            worktree_path: "/tmp/f1".into(),
            phase: None,
            started_at_ms: 1_000,
        }],
        max_concurrency: 2,
        loop_running: Default::default(),
    };
    print_status(&snapshot, OutputFormat::Text);
    print_status(&snapshot, OutputFormat::Json);
}
