// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Subprocess-based transport: spawns a CLI coding agent, feeds it the
//! prompt on stdin, and decodes its `stream-json` stdout into [`Message`]s.

use crate::transport::{LlmTransport, MessageStream};
use crate::types::{Message, QueryRequest};
use async_trait::async_trait;
use automaker_core::error::TransportErrorKind;
use automaker_core::Error;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;

/// Grace period between SIGTERM and SIGKILL when a run is cancelled.
const KILL_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Drives a CLI binary (defaults to `claude`) as the agent process.
pub struct CliTransport {
    binary: String,
}

impl Default for CliTransport {
    fn default() -> Self {
        Self::new("claude")
    }
}

impl CliTransport {
    pub fn new(binary: impl Into<String>) -> Self {
        Self { binary: binary.into() }
    }

    fn build_command(&self, request: &QueryRequest) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .arg("--print")
            .arg("--output-format")
            .arg("stream-json")
            .arg("--model")
            .arg(&request.options.model)
            .arg("--max-turns")
            .arg(request.options.max_turns.to_string())
            .arg("--allowed-tools")
            .arg(request.options.allowed_tools.join(","))
            .current_dir(&request.options.cwd)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        if let Some(system_prompt) = &request.options.system_prompt {
            command.arg("--system-prompt").arg(system_prompt);
        }
        for (key, value) in &request.options.env {
            command.env(key, value);
        }
        command
    }
}

#[async_trait]
impl LlmTransport for CliTransport {
    async fn query(&self, request: QueryRequest) -> Result<MessageStream, Error> {
        let cancellation = request.options.cancellation.clone();
        let mut command = self.build_command(&request);

        let mut child = command.spawn().map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::transport(TransportErrorKind::Other, format!("{} not found on PATH", self.binary))
            } else {
                Error::transport(TransportErrorKind::Other, e.to_string())
            }
        })?;

        let mut stdin = child.stdin.take().ok_or_else(|| {
            Error::transport(TransportErrorKind::Other, "child process has no stdin")
        })?;
        let prompt = request.prompt.clone();
        tokio::spawn(async move {
            let _ = stdin.write_all(prompt.as_bytes()).await;
            let _ = stdin.shutdown().await;
        });

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| Error::transport(TransportErrorKind::Other, "child process has no stdout"))?;

        let pid = child.id();
        let kill_handle = tokio::spawn(async move {
            cancellation.cancelled().await;
            if let Some(pid) = pid {
                send_terminate(pid);
                tokio::time::sleep(KILL_GRACE_PERIOD).await;
                send_kill(pid);
            }
        });

        let (tx, rx) = mpsc::channel(64);
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if !line.trim().is_empty() => {
                        match serde_json::from_str::<Message>(&line) {
                            Ok(message) => {
                                if tx.send(message).await.is_err() {
                                    break;
                                }
                            }
                            Err(error) => {
                                tracing::warn!(%error, %line, "failed to decode agent message");
                            }
                        }
                    }
                    Ok(Some(_)) => continue,
                    Ok(None) => break,
                    Err(error) => {
                        tracing::warn!(%error, "error reading agent stdout");
                        break;
                    }
                }
            }
            match child.wait().await {
                Ok(status) => tracing::info!(%status, "agent process exited"),
                Err(error) => tracing::error!(%error, "failed to wait on agent process"),
            }
            kill_handle.abort();
        });

        Ok(MessageStream::new(rx))
    }
}

fn send_terminate(pid: u32) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGTERM);
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}

fn send_kill(pid: u32) {
    #[cfg(unix)]
    {
        use nix::sys::signal::{kill, Signal};
        use nix::unistd::Pid;
        let _ = kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
    }
    #[cfg(not(unix))]
    {
        let _ = pid;
    }
}

#[cfg(test)]
#[path = "cli_transport_tests.rs"]
mod tests;

