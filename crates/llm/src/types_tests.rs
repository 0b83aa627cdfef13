// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn unknown_block_type_decodes_as_other() {
    let raw = json!({"type": "thinking", "content": "hmm"});
    let block: AssistantBlock = serde_json::from_value(raw).unwrap();
    assert_eq!(block, AssistantBlock::Other);
}

#[test]
fn text_block_round_trips() {
    let block = AssistantBlock::Text { text: "hello".into() };
    let value = serde_json::to_value(&block).unwrap();
    assert_eq!(value["type"], json!("text"));
    let back: AssistantBlock = serde_json::from_value(value).unwrap();
    assert_eq!(back, block);
}

#[test]
fn default_allowed_tools_includes_full_set() {
    let tools = default_allowed_tools();
    assert!(tools.contains(&"Bash".to_string()));
    assert!(tools.contains(&"WebSearch".to_string()));
}

#[test]
fn verify_allowed_tools_excludes_web_tools() {
    let tools = verify_allowed_tools();
    assert!(!tools.contains(&"WebSearch".to_string()));
    assert!(!tools.contains(&"WebFetch".to_string()));
    assert!(tools.contains(&"Bash".to_string()));
}

#[test]
fn query_options_defaults_to_accept_edits_and_full_tools() {
    let options = QueryOptions::new("claude-sonnet-4-5", "/tmp/work");
    assert_eq!(options.permission_mode, PermissionMode::AcceptEdits);
    assert_eq!(options.max_turns, 30);
    assert_eq!(options.allowed_tools, default_allowed_tools());
}
