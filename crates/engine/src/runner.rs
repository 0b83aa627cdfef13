// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Runs one feature through the plan/act/verify loop against the LLM
//! transport, publishing [`ActivityEvent`]s as it goes.

use crate::context::ContextWriter;
use crate::prompt;
use automaker_core::{
    ActivityEvent, CancellationHandle, Clock, Error, Feature, FeatureId, FeatureStatus, Phase,
};
use automaker_events::EventBus;
use automaker_llm::{
    default_allowed_tools, verify_allowed_tools, AssistantBlock, LlmTransport, Message,
    PermissionMode, QueryOptions, QueryRequest,
};
use automaker_storage::FeatureStore;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

const DEFAULT_MAX_TURNS: u32 = 30;
const VERIFY_MAX_TURNS: u32 = 15;

/// The terminal result of one runner invocation. Status mutation is the
/// caller's (the scheduler's) responsibility; the runner only reports.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub passes: bool,
    pub message: Option<String>,
}

pub struct AgentRunner<C: Clock> {
    transport: Arc<dyn LlmTransport>,
    events: Arc<EventBus>,
    store: Arc<FeatureStore<C>>,
    clock: C,
    env: HashMap<String, String>,
}

impl<C: Clock> AgentRunner<C> {
    pub fn new(
        transport: Arc<dyn LlmTransport>,
        events: Arc<EventBus>,
        store: Arc<FeatureStore<C>>,
        clock: C,
    ) -> Self {
        Self { transport, events, store, clock, env: HashMap::new() }
    }

    /// Environment variables merged into every spawned LLM subprocess, on
    /// top of whatever the transport's own `Command` inherits.
    pub fn with_env(mut self, env: HashMap<String, String>) -> Self {
        self.env = env;
        self
    }

    fn publish(&self, event: ActivityEvent) {
        self.events.publish(event);
    }

    fn now(&self) -> u64 {
        self.clock.epoch_ms()
    }

    /// Full plan -> act -> verify run for a fresh or resumed feature.
    pub async fn run(
        &self,
        project_path: &Path,
        feature: &Feature,
        worktree_path: &Path,
        cancellation: CancellationHandle,
        resume: bool,
    ) -> Result<RunOutcome, Error> {
        let feature_id = feature.id.clone();
        self.publish(ActivityEvent::Start { feature_id: feature_id.clone(), timestamp_ms: self.now() });

        let context = ContextWriter::open(project_path, &feature_id).await?;

        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Planning,
        });
        context.append(&format!("# {}\n\n{}", feature.category, feature.description)).await?;

        let action_prompt =
            if resume { prompt::resume_prompt(feature) } else { prompt::action_prompt(feature) };

        if cancellation.is_cancelled() {
            return Ok(self.finish_aborted(&feature_id));
        }

        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Action,
        });

        let aborted = self
            .drive(
                worktree_path,
                feature,
                &action_prompt,
                default_allowed_tools(),
                DEFAULT_MAX_TURNS,
                cancellation.clone(),
                &context,
            )
            .await?;

        if aborted {
            return Ok(self.finish_aborted(&feature_id));
        }

        self.verify(project_path, &feature_id).await
    }

    /// Single-phase variant: skips planning, reuses the existing worktree,
    /// and uses the caller's prompt verbatim.
    pub async fn follow_up(
        &self,
        project_path: &Path,
        feature: &Feature,
        worktree_path: &Path,
        user_prompt: &str,
        cancellation: CancellationHandle,
    ) -> Result<RunOutcome, Error> {
        let feature_id = feature.id.clone();
        self.publish(ActivityEvent::Start { feature_id: feature_id.clone(), timestamp_ms: self.now() });

        let context = ContextWriter::open(project_path, &feature_id).await?;
        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Action,
        });

        let aborted = self
            .drive(
                worktree_path,
                feature,
                &prompt::follow_up_prompt(user_prompt),
                default_allowed_tools(),
                DEFAULT_MAX_TURNS,
                cancellation,
                &context,
            )
            .await?;

        if aborted {
            return Ok(self.finish_aborted(&feature_id));
        }

        self.verify(project_path, &feature_id).await
    }

    /// Verification-only run: no planning, no worktree mutation beyond what
    /// the agent itself performs while checking its work.
    pub async fn verify_only(
        &self,
        project_path: &Path,
        feature: &Feature,
        worktree_path: &Path,
        cancellation: CancellationHandle,
    ) -> Result<RunOutcome, Error> {
        let feature_id = feature.id.clone();
        self.publish(ActivityEvent::Start { feature_id: feature_id.clone(), timestamp_ms: self.now() });

        let context = ContextWriter::open(project_path, &feature_id).await?;
        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Verification,
        });

        let aborted = self
            .drive(
                worktree_path,
                feature,
                &prompt::verify_prompt(feature),
                verify_allowed_tools(),
                VERIFY_MAX_TURNS,
                cancellation,
                &context,
            )
            .await?;

        if aborted {
            return Ok(self.finish_aborted(&feature_id));
        }

        self.verify(project_path, &feature_id).await
    }

    /// Ask the agent to commit the current worktree state.
    pub async fn commit(
        &self,
        project_path: &Path,
        feature: &Feature,
        worktree_path: &Path,
        cancellation: CancellationHandle,
    ) -> Result<RunOutcome, Error> {
        let feature_id = feature.id.clone();
        let context = ContextWriter::open(project_path, &feature_id).await?;
        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Action,
        });

        let aborted = self
            .drive(
                worktree_path,
                feature,
                &prompt::commit_prompt(),
                verify_allowed_tools(),
                VERIFY_MAX_TURNS,
                cancellation,
                &context,
            )
            .await?;

        if aborted {
            // skipTests features being commit-aborted stay in waiting_approval;
            // the scheduler decides the final status transition.
            return Ok(RunOutcome { passes: false, message: Some("aborted".to_string()) });
        }

        self.publish(ActivityEvent::Complete {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            passes: true,
            message: None,
        });
        Ok(RunOutcome { passes: true, message: None })
    }

    /// Streams one LLM query to completion, publishing `progress`/`tool`
    /// events and appending to the context file. Returns `true` if the run
    /// was cancelled before the stream drained.
    async fn drive(
        &self,
        worktree_path: &Path,
        feature: &Feature,
        action_prompt: &str,
        allowed_tools: Vec<String>,
        max_turns: u32,
        cancellation: CancellationHandle,
        context: &ContextWriter,
    ) -> Result<bool, Error> {
        let mut options = QueryOptions::new(feature.model.clone(), worktree_path.to_path_buf());
        options.system_prompt = Some(prompt::system_prompt());
        options.max_turns = max_turns;
        options.allowed_tools = allowed_tools;
        options.permission_mode = PermissionMode::AcceptEdits;
        options.cancellation = cancellation.clone();
        options.env = self.env.clone();

        let request = QueryRequest { prompt: action_prompt.to_string(), options };
        let mut stream = self.transport.query(request).await?;

        let mut first_tool_use = true;
        loop {
            let next = tokio::select! {
                biased;
                _ = cancellation.cancelled() => return Ok(true),
                message = stream.next() => message,
            };
            let Some(message) = next else { break };
            match message {
                Message::Assistant { message } => {
                    for block in message.content {
                        match block {
                            AssistantBlock::Text { text } => {
                                context.append(&text).await?;
                                self.publish(ActivityEvent::Progress {
                                    feature_id: feature.id.clone(),
                                    timestamp_ms: self.now(),
                                    message: text,
                                });
                            }
                            AssistantBlock::ToolUse { name, input } => {
                                if first_tool_use {
                                    first_tool_use = false;
                                    self.publish(ActivityEvent::Progress {
                                        feature_id: feature.id.clone(),
                                        timestamp_ms: self.now(),
                                        message: "Starting implementation".to_string(),
                                    });
                                }
                                self.publish(ActivityEvent::Tool {
                                    feature_id: feature.id.clone(),
                                    timestamp_ms: self.now(),
                                    tool: name,
                                    input,
                                });
                            }
                            AssistantBlock::Other => {}
                        }
                    }
                }
                Message::Error { message } => {
                    self.publish(ActivityEvent::Error {
                        feature_id: feature.id.clone(),
                        timestamp_ms: self.now(),
                        message,
                    });
                }
                Message::User { .. } | Message::Result { .. } => {}
            }
        }
        Ok(false)
    }

    /// Reload the feature from disk: the agent is instructed to update its
    /// own status, so verification here is independent classification of
    /// that terminal status update rather than blind trust of an in-memory
    /// flag the agent's process could have raced against.
    async fn verify(&self, project_path: &Path, feature_id: &FeatureId) -> Result<RunOutcome, Error> {
        self.publish(ActivityEvent::Phase {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            phase: Phase::Verification,
        });

        let list = self.store.load(project_path)?;
        let passes = list.get(feature_id).map(|f| f.status == FeatureStatus::Verified).unwrap_or(false);

        let message = if passes { None } else { Some("verification did not pass".to_string()) };
        self.publish(ActivityEvent::Complete {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            passes,
            message: message.clone(),
        });
        Ok(RunOutcome { passes, message })
    }

    fn finish_aborted(&self, feature_id: &FeatureId) -> RunOutcome {
        self.publish(ActivityEvent::Complete {
            feature_id: feature_id.clone(),
            timestamp_ms: self.now(),
            passes: false,
            message: Some("aborted".to_string()),
        });
        RunOutcome { passes: false, message: Some("aborted".to_string()) }
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
