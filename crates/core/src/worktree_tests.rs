// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn worktree(branch: &str) -> Worktree {
    Worktree {
        branch_name: branch.into(),
        path: format!("/tmp/{branch}"),
        is_new: false,
        commits_ahead: 0,
        dirty: false,
    }
}

#[test]
fn main_and_master_are_recognized_as_main() {
    assert!(worktree("main").is_main());
    assert!(worktree("master").is_main());
    assert!(!worktree("feature/login").is_main());
}

#[test]
fn failed_status_displays_reason() {
    let status = WorktreeStatus::Failed { reason: "dirty tree".into() };
    assert_eq!(status.to_string(), "failed: dirty tree");
}
