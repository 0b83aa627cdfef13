// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::{Feature, ImageRef};

#[test]
fn action_prompt_includes_numbered_steps_and_images() {
    let mut feature = Feature::builder()
        .description("Add dark mode")
        .steps(vec!["add toggle".into(), "persist preference".into()])
        .build();
    feature.image_paths = vec![ImageRef { path: "/tmp/a.png".into(), filename: "a.png".into() }];

    let prompt = action_prompt(&feature);
    assert!(prompt.contains("Add dark mode"));
    assert!(prompt.contains("1. add toggle"));
    assert!(prompt.contains("2. persist preference"));
    assert!(prompt.contains("a.png (/tmp/a.png)"));
}

#[test]
fn follow_up_prompt_is_passed_through_verbatim() {
    assert_eq!(follow_up_prompt("fix the typo"), "fix the typo");
}
