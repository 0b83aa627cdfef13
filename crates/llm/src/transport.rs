// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The transport contract: one `query` call opens an async stream of
//! messages. Implementations live behind this trait so the runner never
//! depends on how a given provider is actually invoked.

use crate::types::{Message, QueryRequest};
use async_trait::async_trait;
use automaker_core::Error;
use tokio::sync::mpsc;

#[async_trait]
pub trait LlmTransport: Send + Sync {
    async fn query(&self, request: QueryRequest) -> Result<MessageStream, Error>;
}

/// A live cursor over one query's message stream.
pub struct MessageStream {
    receiver: mpsc::Receiver<Message>,
}

impl MessageStream {
    pub fn new(receiver: mpsc::Receiver<Message>) -> Self {
        Self { receiver }
    }

    pub async fn next(&mut self) -> Option<Message> {
        self.receiver.recv().await
    }
}

#[cfg(any(test, feature = "test-support"))]
pub mod fake {
    use super::*;
    use parking_lot::Mutex;
    use std::collections::VecDeque;
    use std::sync::Arc;

    /// Replays a fixed, pre-scripted message sequence; used by engine
    /// tests that exercise the runner without a real subprocess.
    pub struct ScriptedTransport {
        script: Arc<Mutex<VecDeque<Vec<Message>>>>,
    }

    impl ScriptedTransport {
        pub fn new(scripts: Vec<Vec<Message>>) -> Self {
            Self { script: Arc::new(Mutex::new(scripts.into())) }
        }
    }

    #[async_trait]
    impl LlmTransport for ScriptedTransport {
        async fn query(&self, _request: QueryRequest) -> Result<MessageStream, Error> {
            let messages = self
                .script
                .lock()
                .pop_front()
                .ok_or_else(|| Error::state("scripted transport ran out of responses"))?;
            let (tx, rx) = mpsc::channel(messages.len().max(1));
            for message in messages {
                let _ = tx.send(message).await;
            }
            Ok(MessageStream::new(rx))
        }
    }
}

#[cfg(test)]
#[path = "transport_tests.rs"]
mod tests;
