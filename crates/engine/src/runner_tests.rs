// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::{FakeClock, Phase};
use automaker_llm::fake::ScriptedTransport;
use automaker_llm::AssistantMessage;
use automaker_storage::FeatureStore;

fn runner(
    scripts: Vec<Vec<Message>>,
) -> (AgentRunner<FakeClock>, Arc<FeatureStore<FakeClock>>, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let clock = FakeClock::new();
    let store = Arc::new(FeatureStore::new(clock.clone()));
    let transport = Arc::new(ScriptedTransport::new(scripts));
    let events = Arc::new(EventBus::default());
    let runner = AgentRunner::new(transport, events, store.clone(), clock);
    (runner, store, dir)
}

fn write_feature(dir: &Path, feature: &Feature) {
    let list = automaker_core::FeatureList::new(vec![feature.clone()]);
    let path = dir.join(".automaker").join("feature_list.json");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, serde_json::to_string(&list).unwrap()).unwrap();
}

#[tokio::test]
async fn successful_run_reports_passes_when_agent_marks_verified() {
    let scripts = vec![vec![
        Message::Assistant {
            message: AssistantMessage {
                content: vec![AssistantBlock::Text { text: "implementing".into() }],
            },
        },
        Message::Result { summary: Some("done".into()) },
    ]];
    let (runner, _store, dir) = runner(scripts);

    let mut feature = Feature::builder().description("add widget").build();
    feature.status = FeatureStatus::Verified;
    write_feature(dir.path(), &feature);

    let outcome = runner
        .run(dir.path(), &feature, dir.path(), CancellationHandle::new(), false)
        .await
        .unwrap();
    assert!(outcome.passes);
}

#[tokio::test]
async fn run_reports_failure_when_agent_never_marks_verified() {
    let scripts = vec![vec![Message::Result { summary: Some("done".into()) }]];
    let (runner, _store, dir) = runner(scripts);

    let feature = Feature::builder().description("add widget").build();
    write_feature(dir.path(), &feature);

    let outcome = runner
        .run(dir.path(), &feature, dir.path(), CancellationHandle::new(), false)
        .await
        .unwrap();
    assert!(!outcome.passes);
}

#[tokio::test]
async fn cancelled_run_reports_aborted_without_touching_status() {
    let (runner, _store, dir) = runner(vec![]);
    let feature = Feature::builder().description("add widget").build();
    write_feature(dir.path(), &feature);

    let cancellation = CancellationHandle::new();
    cancellation.cancel();

    let outcome = runner
        .run(dir.path(), &feature, dir.path(), cancellation, false)
        .await
        .unwrap();
    assert!(!outcome.passes);
    assert_eq!(outcome.message.as_deref(), Some("aborted"));
}

#[tokio::test]
async fn tool_use_blocks_publish_tool_events() {
    let scripts = vec![vec![
        Message::Assistant {
            message: AssistantMessage {
                content: vec![AssistantBlock::ToolUse {
                    name: "Write".into(),
                    input: serde_json::json!({"path": "src/lib.rs"}),
                }],
            },
        },
        Message::Result { summary: None },
    ]];
    let (runner, _store, dir) = runner(scripts);
    let mut feature = Feature::builder().description("add widget").build();
    feature.status = FeatureStatus::Verified;
    write_feature(dir.path(), &feature);

    let mut subscription = runner.events.subscribe(&feature.id);
    runner.run(dir.path(), &feature, dir.path(), CancellationHandle::new(), false).await.unwrap();

    let mut saw_tool = false;
    while let Some(event) = subscription.next().await {
        if matches!(event, ActivityEvent::Tool { .. }) {
            saw_tool = true;
        }
        if event.is_terminal() {
            break;
        }
    }
    assert!(saw_tool);
}

#[tokio::test]
async fn successful_run_publishes_verification_phase_before_complete() {
    let scripts = vec![vec![Message::Result { summary: Some("done".into()) }]];
    let (runner, _store, dir) = runner(scripts);
    let mut feature = Feature::builder().description("add widget").build();
    feature.status = FeatureStatus::Verified;
    write_feature(dir.path(), &feature);

    let mut subscription = runner.events.subscribe(&feature.id);
    runner.run(dir.path(), &feature, dir.path(), CancellationHandle::new(), false).await.unwrap();

    let mut saw_verification_phase = false;
    while let Some(event) = subscription.next().await {
        if let ActivityEvent::Phase { phase: Phase::Verification, .. } = event {
            saw_verification_phase = true;
        }
        if let ActivityEvent::Complete { passes, .. } = event {
            assert!(saw_verification_phase, "verification phase must publish before complete");
            assert!(passes);
            break;
        }
    }
    assert!(saw_verification_phase);
}

#[tokio::test]
async fn commit_publishes_complete_on_success() {
    let scripts = vec![vec![Message::Result { summary: Some("committed".into()) }]];
    let (runner, _store, dir) = runner(scripts);
    let feature = Feature::builder().description("add widget").build();
    write_feature(dir.path(), &feature);

    let mut subscription = runner.events.subscribe(&feature.id);
    let outcome =
        runner.commit(dir.path(), &feature, dir.path(), CancellationHandle::new()).await.unwrap();
    assert!(outcome.passes);

    let mut saw_complete = false;
    while let Some(event) = subscription.next().await {
        if let ActivityEvent::Complete { passes, .. } = event {
            saw_complete = true;
            assert!(passes);
            break;
        }
    }
    assert!(saw_complete, "commit must publish a complete event on success");
}
