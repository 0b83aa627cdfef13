// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::fake::ScriptedTransport;
use super::*;
use crate::types::{AssistantBlock, AssistantMessage, QueryOptions};

#[tokio::test]
async fn scripted_transport_replays_messages_in_order() {
    let transport = ScriptedTransport::new(vec![vec![
        Message::Assistant {
            message: AssistantMessage { content: vec![AssistantBlock::Text { text: "hi".into() }] },
        },
        Message::Result { summary: Some("done".into()) },
    ]]);

    let request =
        QueryRequest { prompt: "do it".into(), options: QueryOptions::new("model", "/tmp") };
    let mut stream = transport.query(request).await.unwrap();
    assert!(matches!(stream.next().await, Some(Message::Assistant { .. })));
    assert!(matches!(stream.next().await, Some(Message::Result { .. })));
    assert!(stream.next().await.is_none());
}

#[tokio::test]
async fn scripted_transport_errors_once_scripts_are_exhausted() {
    let transport = ScriptedTransport::new(vec![]);
    let request =
        QueryRequest { prompt: "do it".into(), options: QueryOptions::new("model", "/tmp") };
    assert!(transport.query(request).await.is_err());
}
