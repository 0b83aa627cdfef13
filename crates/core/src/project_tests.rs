// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn derived_paths_live_under_automaker_dir() {
    let project = Project::new("/repo/my-app", "main");
    assert_eq!(project.state_dir(), std::path::Path::new("/repo/my-app/.automaker"));
    assert_eq!(
        project.feature_list_path(),
        std::path::Path::new("/repo/my-app/.automaker/feature_list.json")
    );
    assert_eq!(
        project.categories_path(),
        std::path::Path::new("/repo/my-app/.automaker/categories.json")
    );
    assert_eq!(project.context_dir(), std::path::Path::new("/repo/my-app/.automaker/context"));
}

#[test]
fn two_projects_get_distinct_ids() {
    let a = Project::new("/repo/a", "main");
    let b = Project::new("/repo/b", "main");
    assert_ne!(a.id, b.id);
}
