// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Top-level CLI surface: one subcommand per Scheduler operation.

use crate::exit_error::ExitError;
use crate::output::{self, OutputFormat};
use automaker_core::{FeatureId, SystemClock};
use automaker_engine::Scheduler;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "automaker", version, styles = crate::color::styles())]
pub struct Cli {
    /// Project directory containing `.automaker/`.
    #[arg(long, global = true, default_value = ".")]
    pub project: PathBuf,

    /// Maximum number of simultaneously live agent runs.
    #[arg(long, global = true, default_value_t = 1)]
    pub max_concurrency: usize,

    /// The project's main branch, used as the worktree branch for
    /// features that don't name one of their own.
    #[arg(long, global = true, default_value = "main")]
    pub branch_main: String,

    /// Coding-agent CLI binary to drive as the LLM transport.
    #[arg(long, global = true, default_value = "claude")]
    pub agent_binary: String,

    /// Extra `KEY=VALUE` pairs forwarded to every spawned subprocess,
    /// overriding both the settings file and the process environment.
    #[arg(long = "set", global = true, value_parser = parse_env_pair)]
    pub env: Vec<(String, String)>,

    #[command(subcommand)]
    pub command: Command,
}

fn parse_env_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) =
        raw.split_once('=').ok_or_else(|| format!("expected KEY=VALUE, got `{raw}`"))?;
    Ok((key.to_string(), value.to_string()))
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backlog feature through plan/act/verify.
    Run {
        feature_id: String,
        #[arg(long)]
        use_worktrees: bool,
    },
    /// Continue a feature that didn't finish verified.
    Resume {
        feature_id: String,
        #[arg(long)]
        use_worktrees: bool,
    },
    /// Re-run verification only, without a fresh action phase.
    Verify { feature_id: String },
    /// Send a fresh instruction to an existing feature.
    FollowUp { feature_id: String, prompt: String },
    /// Ask the agent to commit the current worktree state.
    Commit { feature_id: String },
    /// Cancel a feature's in-flight run.
    Stop { feature_id: String },
    /// Print the scheduler's current concurrency and in-flight runs.
    Status {
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
    /// Reset any `in_progress` feature stranded by an unclean shutdown.
    Reconcile,
    /// Continuously pick and run backlog features until the list is drained.
    StartLoop,
}

pub async fn dispatch(
    scheduler: Arc<Scheduler<SystemClock>>,
    project: &std::path::Path,
    command: Command,
) -> Result<(), ExitError> {
    match command {
        Command::Run { feature_id, use_worktrees } => {
            scheduler
                .run_feature(project, &FeatureId::new(feature_id), use_worktrees, None)
                .await
                .map_err(startup_error)?;
        }
        Command::Resume { feature_id, use_worktrees } => {
            scheduler
                .resume_feature(project, &FeatureId::new(feature_id), use_worktrees, None)
                .await
                .map_err(startup_error)?;
        }
        Command::Verify { feature_id } => {
            scheduler.verify_feature(project, &FeatureId::new(feature_id)).await.map_err(startup_error)?;
        }
        Command::FollowUp { feature_id, prompt } => {
            scheduler
                .follow_up_feature(project, &FeatureId::new(feature_id), &prompt, None)
                .await
                .map_err(startup_error)?;
        }
        Command::Commit { feature_id } => {
            scheduler
                .commit_feature(project, &FeatureId::new(feature_id), None)
                .await
                .map_err(startup_error)?;
        }
        Command::Stop { feature_id } => {
            scheduler.stop_feature(&FeatureId::new(feature_id));
        }
        Command::Status { format } => {
            output::print_status(&scheduler.status(), format);
        }
        Command::Reconcile => {
            let reconciled = scheduler.reconcile_on_startup(project).map_err(startup_error)?;
            println!("reconciled {reconciled} stale feature(s)");
        }
        Command::StartLoop => {
            scheduler.clone().start_loop(project.to_path_buf()).map_err(startup_error)?;
            tokio::signal::ctrl_c().await.map_err(|e| ExitError::new(1, e.to_string()))?;
            scheduler.stop_loop(project);
            return Err(ExitError::new(130, "loop stopped by signal"));
        }
    }
    Ok(())
}

/// The feature a SIGINT mid-run should cancel, if the command names one.
pub fn feature_id_of(command: &Command) -> Option<FeatureId> {
    match command {
        Command::Run { feature_id, .. }
        | Command::Resume { feature_id, .. }
        | Command::Verify { feature_id }
        | Command::FollowUp { feature_id, .. }
        | Command::Commit { feature_id } => Some(FeatureId::new(feature_id.clone())),
        Command::Stop { .. } | Command::Status { .. } | Command::Reconcile | Command::StartLoop => None,
    }
}

fn startup_error(error: automaker_core::Error) -> ExitError {
    ExitError::new(1, error.to_string())
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
