// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Wire types for the LLM transport contract: one `query` call returns an
//! async stream of these messages.

use automaker_core::CancellationHandle;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// A content block inside an assistant message. Unknown block types
/// decode into `Other` rather than failing, since the transport may add
/// block kinds this crate doesn't act on yet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AssistantBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse { name: String, input: serde_json::Value },
    #[serde(other)]
    Other,
}

/// One message in the transport's response stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    User { content: String },
    Assistant { message: AssistantMessage },
    Result { summary: Option<String> },
    Error { message: String },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantMessage {
    pub content: Vec<AssistantBlock>,
}

/// How a tool call should be approved before it executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PermissionMode {
    #[default]
    AcceptEdits,
    RequireApproval,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SandboxOptions {
    pub enabled: bool,
    pub auto_allow_bash_if_sandboxed: bool,
}

/// Options recognized by `query`, mirrored from the transport contract.
#[derive(Debug, Clone)]
pub struct QueryOptions {
    pub model: String,
    pub system_prompt: Option<String>,
    pub max_turns: u32,
    pub cwd: PathBuf,
    pub allowed_tools: Vec<String>,
    pub permission_mode: PermissionMode,
    pub sandbox: SandboxOptions,
    pub env: HashMap<String, String>,
    pub cancellation: CancellationHandle,
}

impl QueryOptions {
    pub fn new(model: impl Into<String>, cwd: impl Into<PathBuf>) -> Self {
        Self {
            model: model.into(),
            system_prompt: None,
            max_turns: 30,
            cwd: cwd.into(),
            allowed_tools: default_allowed_tools(),
            permission_mode: PermissionMode::AcceptEdits,
            sandbox: SandboxOptions::default(),
            env: HashMap::new(),
            cancellation: CancellationHandle::new(),
        }
    }
}

/// The full action-phase tool allow-list.
pub fn default_allowed_tools() -> Vec<String> {
    ["Read", "Write", "Edit", "Glob", "Grep", "Bash", "WebSearch", "WebFetch"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// The reduced allow-list used during verify-only runs.
pub fn verify_allowed_tools() -> Vec<String> {
    ["Read", "Write", "Edit", "Glob", "Grep", "Bash"].iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone)]
pub struct QueryRequest {
    pub prompt: String,
    pub options: QueryOptions,
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
