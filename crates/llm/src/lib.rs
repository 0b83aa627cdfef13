// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Transport for talking to a coding-agent process: wire types, the
//! `LlmTransport` seam, and the concrete CLI-subprocess adapter.

mod cli_transport;
mod transport;
mod types;

pub use cli_transport::CliTransport;
pub use transport::{LlmTransport, MessageStream};
pub use types::{
    default_allowed_tools, verify_allowed_tools, AssistantBlock, AssistantMessage, Message,
    PermissionMode, QueryOptions, QueryRequest, SandboxOptions,
};

#[cfg(any(test, feature = "test-support"))]
pub use transport::fake;
