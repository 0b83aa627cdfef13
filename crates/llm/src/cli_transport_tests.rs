// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::types::QueryOptions;

#[tokio::test]
async fn missing_binary_reports_transport_error() {
    let transport = CliTransport::new("definitely-not-a-real-binary-anywhere");
    let request =
        QueryRequest { prompt: "hello".into(), options: QueryOptions::new("model", "/tmp") };
    let result = transport.query(request).await;
    assert!(result.is_err());
}

#[test]
fn build_command_carries_model_and_cwd() {
    let transport = CliTransport::new("claude");
    let mut options = QueryOptions::new("claude-sonnet-4-5", std::env::temp_dir());
    options.system_prompt = Some("be terse".into());
    let request = QueryRequest { prompt: "do it".into(), options };

    let command = transport.build_command(&request);
    let std_command = command.as_std();
    let args: Vec<String> =
        std_command.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
    assert!(args.iter().any(|a| a == "claude-sonnet-4-5"));
    assert!(args.iter().any(|a| a == "be terse"));
    assert_eq!(std_command.get_current_dir(), Some(std::env::temp_dir().as_path()));
}
