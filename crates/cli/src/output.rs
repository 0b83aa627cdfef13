// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Renders a [`Snapshot`] as either a colored text table or JSON.

use automaker_engine::Snapshot;
use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Serialize)]
struct RunningFeatureJson {
    feature_id: String,
    worktree_path: String,
    phase: Option<String>,
    started_at_ms: u64,
}

#[derive(Serialize)]
struct SnapshotJson {
    max_concurrency: usize,
    running: Vec<RunningFeatureJson>,
}

pub fn print_status(snapshot: &Snapshot, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_status_json(snapshot),
        OutputFormat::Text => print_status_text(snapshot),
    }
}

fn print_status_json(snapshot: &Snapshot) {
    let payload = SnapshotJson {
        max_concurrency: snapshot.max_concurrency,
        running: snapshot
            .running
            .iter()
            .map(|r| RunningFeatureJson {
                feature_id: r.feature_id.to_string(),
                worktree_path: r.worktree_path.display().to_string(),
                phase: r.phase.map(|p| p.to_string()),
                started_at_ms: r.started_at_ms,
            })
            .collect(),
    };
    match serde_json::to_string_pretty(&payload) {
        Ok(json) => println!("{json}"),
        Err(error) => eprintln!("failed to serialize status: {error}"),
    }
}

fn print_status_text(snapshot: &Snapshot) {
    println!(
        "{} {}/{} running",
        crate::color::header("concurrency:"),
        snapshot.running.len(),
        snapshot.max_concurrency
    );
    if snapshot.running.is_empty() {
        println!("{}", crate::color::muted("  (no active runs)"));
        return;
    }
    for running in &snapshot.running {
        let phase = running.phase.map(|p| p.to_string()).unwrap_or_else(|| "starting".to_string());
        println!(
            "  {} {} {}",
            crate::color::literal(running.feature_id.as_str()),
            crate::color::context(&phase),
            crate::color::muted(&running.worktree_path.display().to_string()),
        );
    }
}

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;
