// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launches one Scheduler operation against a project directory, then
//! exits. `start-loop` blocks until interrupted.

mod color;
mod commands;
mod exit_error;
mod logging;
mod output;
mod settings;

use automaker_core::{Project, SystemClock};
use automaker_engine::{AgentRunner, Scheduler, SchedulerConfig};
use automaker_events::EventBus;
use automaker_llm::CliTransport;
use automaker_storage::FeatureStore;
use automaker_worktree::WorktreeManager;
use clap::Parser;
use commands::Cli;
use exit_error::ExitError;
use std::collections::HashMap;
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init();

    let code = match run(cli).await {
        Ok(()) => 0,
        Err(error) => {
            tracing::error!(message = %error.message, code = error.code, "command failed");
            eprintln!("error: {}", error.message);
            error.code
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<(), ExitError> {
    let project = Project::new(cli.project.clone(), cli.branch_main.clone());
    let cli_env: HashMap<String, String> = cli.env.into_iter().collect();
    let settings = settings::Settings::load(&cli_env);

    let clock = SystemClock;
    let store = Arc::new(FeatureStore::new(clock.clone()));
    let worktrees = Arc::new(WorktreeManager::new());
    let events = Arc::new(EventBus::default());
    let transport = Arc::new(CliTransport::new(cli.agent_binary));
    let runner = Arc::new(
        AgentRunner::new(transport, events.clone(), store.clone(), clock.clone()).with_env(settings.env),
    );
    let config = SchedulerConfig {
        max_concurrency: cli.max_concurrency,
        default_branch: project.branch_main.clone(),
        ..SchedulerConfig::default()
    };
    let scheduler = Arc::new(Scheduler::new(store, worktrees, events, runner, clock, config));

    let feature_id = commands::feature_id_of(&cli.command);
    let is_loop = matches!(cli.command, commands::Command::StartLoop);
    let dispatch = commands::dispatch(scheduler.clone(), &project.path, cli.command);

    if is_loop {
        return dispatch.await;
    }

    tokio::select! {
        biased;
        signal = tokio::signal::ctrl_c() => {
            signal.map_err(|e| ExitError::new(1, e.to_string()))?;
            if let Some(id) = feature_id {
                scheduler.stop_feature(&id);
            }
            Err(ExitError::new(130, "interrupted"))
        }
        result = dispatch => result,
    }
}
