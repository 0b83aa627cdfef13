// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The public surface: start/stop/resume/verify/follow-up/commit, enforcing
//! the concurrency cap and owning every in-flight run's cancellation handle.

use crate::dependency::DependencyResolver;
use crate::runner::AgentRunner;
use automaker_core::{
    ActivityEvent, CancellationHandle, Clock, Error, FeatureId, FeatureStatus, Phase,
};
use automaker_events::EventBus;
use automaker_storage::{FeaturePatch, FeatureStore};
use automaker_worktree::WorktreeManager;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;

/// One active run's shared state, owned exclusively by the scheduler.
struct RunContext {
    worktree_path: PathBuf,
    cancellation: CancellationHandle,
    phase: Arc<Mutex<Option<Phase>>>,
    started_at_ms: u64,
}

/// A snapshot of one currently-running feature, for [`Scheduler::status`].
#[derive(Debug, Clone)]
pub struct RunningFeature {
    pub feature_id: FeatureId,
    pub worktree_path: PathBuf,
    pub phase: Option<Phase>,
    pub started_at_ms: u64,
}

/// A lock-free-to-read snapshot of scheduler state.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub running: Vec<RunningFeature>,
    pub max_concurrency: usize,
    pub loop_running: HashMap<PathBuf, bool>,
}

pub struct SchedulerConfig {
    pub max_concurrency: usize,
    pub enable_dependency_blocking: bool,
    pub stale_after_ms: u64,
    /// The project's main branch name, from [`automaker_core::Project::branch_main`].
    /// Used as the worktree branch for features that don't name their own.
    pub default_branch: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 1,
            enable_dependency_blocking: false,
            stale_after_ms: 10 * 60_000,
            default_branch: "main".to_string(),
        }
    }
}

pub struct Scheduler<C: Clock> {
    store: Arc<FeatureStore<C>>,
    worktrees: Arc<WorktreeManager>,
    events: Arc<EventBus>,
    runner: Arc<AgentRunner<C>>,
    resolver: DependencyResolver,
    clock: C,
    config: SchedulerConfig,
    semaphore: Arc<Semaphore>,
    runs: Mutex<HashMap<FeatureId, RunContext>>,
    loops: Mutex<HashMap<PathBuf, (Arc<AtomicBool>, JoinHandle<()>)>>,
}

impl<C: Clock + 'static> Scheduler<C> {
    pub fn new(
        store: Arc<FeatureStore<C>>,
        worktrees: Arc<WorktreeManager>,
        events: Arc<EventBus>,
        runner: Arc<AgentRunner<C>>,
        clock: C,
        config: SchedulerConfig,
    ) -> Self {
        let semaphore = Arc::new(Semaphore::new(config.max_concurrency));
        Self {
            store,
            worktrees,
            events,
            runner,
            resolver: DependencyResolver::new(),
            clock,
            config,
            semaphore,
            runs: Mutex::new(HashMap::new()),
            loops: Mutex::new(HashMap::new()),
        }
    }

    pub fn can_start(&self) -> bool {
        self.semaphore.available_permits() > 0
    }

    pub fn status(&self) -> Snapshot {
        let runs = self.runs.lock();
        let running = runs
            .iter()
            .map(|(feature_id, context)| RunningFeature {
                feature_id: feature_id.clone(),
                worktree_path: context.worktree_path.clone(),
                phase: *context.phase.lock(),
                started_at_ms: context.started_at_ms,
            })
            .collect();
        let loop_running =
            self.loops.lock().iter().map(|(path, (running, _))| (path.clone(), running.load(Ordering::SeqCst))).collect();
        Snapshot { running, max_concurrency: self.config.max_concurrency, loop_running }
    }

    /// Cancel the named run. Safe to call when no run is active.
    pub fn stop_feature(&self, feature_id: &FeatureId) {
        if let Some(context) = self.runs.lock().get(feature_id) {
            context.cancellation.cancel();
        }
    }

    fn track_phase(&self, feature_id: FeatureId) -> Arc<Mutex<Option<Phase>>> {
        let phase = Arc::new(Mutex::new(None));
        let tracked = phase.clone();
        let mut subscription = self.events.subscribe(&feature_id);
        tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                if let ActivityEvent::Phase { phase: p, .. } = event {
                    *tracked.lock() = Some(p);
                }
                if event.is_terminal() {
                    break;
                }
            }
        });
        phase
    }

    /// One-shot run of one feature, respecting the concurrency cap.
    pub async fn run_feature(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        use_worktrees: bool,
        worktree_path_override: Option<PathBuf>,
    ) -> Result<(), Error> {
        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| {
            Error::ConcurrencyLimit {
                running: self.config.max_concurrency - self.semaphore.available_permits(),
                max: self.config.max_concurrency,
            }
        })?;

        let list = self.store.load(project_path)?;
        let feature = list
            .get(feature_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;

        let worktree_path = self.resolve_worktree(project_path, &feature, use_worktrees, worktree_path_override).await?;

        let started_at = self.clock.epoch_ms();
        self.store.update(
            project_path,
            feature_id,
            FeaturePatch {
                status: Some(FeatureStatus::InProgress),
                started_at: Some(Some(iso8601(started_at))),
                worktree_path: Some(Some(worktree_path.to_string_lossy().to_string())),
                ..Default::default()
            },
        )?;

        let cancellation = CancellationHandle::new();
        self.runs.lock().insert(
            feature_id.clone(),
            RunContext {
                worktree_path: worktree_path.clone(),
                cancellation: cancellation.clone(),
                phase: self.track_phase(feature_id.clone()),
                started_at_ms: started_at,
            },
        );

        let outcome =
            self.runner.run(project_path, &feature, &worktree_path, cancellation, false).await;
        self.runs.lock().remove(feature_id);
        drop(permit);

        self.apply_run_result(project_path, feature_id, feature.skip_tests, outcome)
    }

    /// Like [`Self::run_feature`] but phrased to the agent as a
    /// continuation. The feature must not already be verified.
    pub async fn resume_feature(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        use_worktrees: bool,
        worktree_path_override: Option<PathBuf>,
    ) -> Result<(), Error> {
        let list = self.store.load(project_path)?;
        let feature = list
            .get(feature_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;
        if feature.status == FeatureStatus::Verified {
            return Err(Error::state(format!("feature {feature_id} is already verified")));
        }

        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| {
            Error::ConcurrencyLimit {
                running: self.config.max_concurrency - self.semaphore.available_permits(),
                max: self.config.max_concurrency,
            }
        })?;

        let worktree_path = self.resolve_worktree(project_path, &feature, use_worktrees, worktree_path_override).await?;
        let started_at = self.clock.epoch_ms();
        self.store.update(
            project_path,
            feature_id,
            FeaturePatch {
                status: Some(FeatureStatus::InProgress),
                started_at: Some(Some(iso8601(started_at))),
                ..Default::default()
            },
        )?;

        let cancellation = CancellationHandle::new();
        self.runs.lock().insert(
            feature_id.clone(),
            RunContext {
                worktree_path: worktree_path.clone(),
                cancellation: cancellation.clone(),
                phase: self.track_phase(feature_id.clone()),
                started_at_ms: started_at,
            },
        );

        let outcome =
            self.runner.run(project_path, &feature, &worktree_path, cancellation, true).await;
        self.runs.lock().remove(feature_id);
        drop(permit);

        self.apply_run_result(project_path, feature_id, feature.skip_tests, outcome)
    }

    /// Verification-only run: no worktree mutation beyond what the feature
    /// already has assigned.
    pub async fn verify_feature(&self, project_path: &Path, feature_id: &FeatureId) -> Result<(), Error> {
        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| {
            Error::ConcurrencyLimit {
                running: self.config.max_concurrency - self.semaphore.available_permits(),
                max: self.config.max_concurrency,
            }
        })?;

        let list = self.store.load(project_path)?;
        let feature = list
            .get(feature_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;
        let worktree_path = feature
            .worktree_path
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| project_path.to_path_buf());

        let cancellation = CancellationHandle::new();
        self.runs.lock().insert(
            feature_id.clone(),
            RunContext {
                worktree_path: worktree_path.clone(),
                cancellation: cancellation.clone(),
                phase: self.track_phase(feature_id.clone()),
                started_at_ms: self.clock.epoch_ms(),
            },
        );

        let outcome = self.runner.verify_only(project_path, &feature, &worktree_path, cancellation).await;
        self.runs.lock().remove(feature_id);
        drop(permit);

        self.apply_run_result(project_path, feature_id, feature.skip_tests, outcome)
    }

    /// Continue a `waiting_approval`/`verified` feature with a fresh prompt.
    pub async fn follow_up_feature(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        user_prompt: &str,
        worktree_path_override: Option<PathBuf>,
    ) -> Result<(), Error> {
        let permit = self.semaphore.clone().try_acquire_owned().map_err(|_| {
            Error::ConcurrencyLimit {
                running: self.config.max_concurrency - self.semaphore.available_permits(),
                max: self.config.max_concurrency,
            }
        })?;

        let list = self.store.load(project_path)?;
        let feature = list
            .get(feature_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;
        let worktree_path = worktree_path_override
            .or_else(|| feature.worktree_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| project_path.to_path_buf());

        self.store.update(
            project_path,
            feature_id,
            FeaturePatch {
                status: Some(FeatureStatus::InProgress),
                just_finished_at: Some(None),
                ..Default::default()
            },
        )?;

        let cancellation = CancellationHandle::new();
        self.runs.lock().insert(
            feature_id.clone(),
            RunContext {
                worktree_path: worktree_path.clone(),
                cancellation: cancellation.clone(),
                phase: self.track_phase(feature_id.clone()),
                started_at_ms: self.clock.epoch_ms(),
            },
        );

        let outcome = self
            .runner
            .follow_up(project_path, &feature, &worktree_path, user_prompt, cancellation)
            .await;
        self.runs.lock().remove(feature_id);
        drop(permit);

        self.apply_run_result(project_path, feature_id, feature.skip_tests, outcome)
    }

    /// Ask the agent to commit the worktree; on success the feature becomes
    /// `verified`. A `skipTests` feature that gets cancelled mid-commit
    /// stays `waiting_approval` so the user can retry.
    pub async fn commit_feature(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        worktree_path_override: Option<PathBuf>,
    ) -> Result<(), Error> {
        let list = self.store.load(project_path)?;
        let feature = list
            .get(feature_id)
            .cloned()
            .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;
        let worktree_path = worktree_path_override
            .or_else(|| feature.worktree_path.as_ref().map(PathBuf::from))
            .unwrap_or_else(|| project_path.to_path_buf());

        let cancellation = CancellationHandle::new();
        self.runs.lock().insert(
            feature_id.clone(),
            RunContext {
                worktree_path: worktree_path.clone(),
                cancellation: cancellation.clone(),
                phase: self.track_phase(feature_id.clone()),
                started_at_ms: self.clock.epoch_ms(),
            },
        );
        let outcome = self.runner.commit(project_path, &feature, &worktree_path, cancellation).await;
        self.runs.lock().remove(feature_id);

        match outcome {
            Ok(result) if result.passes => {
                self.store.update(
                    project_path,
                    feature_id,
                    FeaturePatch {
                        status: Some(FeatureStatus::Verified),
                        just_finished_at: Some(None),
                        ..Default::default()
                    },
                )?;
                Ok(())
            }
            Ok(_) => Ok(()),
            Err(error) => {
                self.events.publish(ActivityEvent::Error {
                    feature_id: feature_id.clone(),
                    timestamp_ms: self.clock.epoch_ms(),
                    message: error.to_string(),
                });
                Err(error)
            }
        }
    }

    /// Apply the transition contract for a completed run and translate
    /// transport/persistence errors into an `error` event.
    fn apply_run_result(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        skip_tests: bool,
        outcome: Result<crate::runner::RunOutcome, Error>,
    ) -> Result<(), Error> {
        let outcome = match outcome {
            Ok(outcome) => outcome,
            Err(error) => {
                self.events.publish(ActivityEvent::Error {
                    feature_id: feature_id.clone(),
                    timestamp_ms: self.clock.epoch_ms(),
                    message: error.to_string(),
                });
                return Err(error);
            }
        };

        if !outcome.passes {
            // Aborted or failed runs stay `in_progress`; the user or the
            // loop retries. No patch needed.
            return Ok(());
        }

        let status = if skip_tests { FeatureStatus::WaitingApproval } else { FeatureStatus::Verified };
        self.store.update(
            project_path,
            feature_id,
            FeaturePatch {
                status: Some(status),
                just_finished_at: Some(Some(iso8601(self.clock.epoch_ms()))),
                ..Default::default()
            },
        )?;
        Ok(())
    }

    async fn resolve_worktree(
        &self,
        project_path: &Path,
        feature: &automaker_core::Feature,
        use_worktrees: bool,
        worktree_path_override: Option<PathBuf>,
    ) -> Result<PathBuf, Error> {
        if let Some(path) = worktree_path_override {
            return Ok(path);
        }
        if !use_worktrees {
            return Ok(project_path.to_path_buf());
        }
        let branch = feature.branch_name.clone().unwrap_or_else(|| self.config.default_branch.clone());
        let (path, _is_new) = self.worktrees.ensure(project_path, &branch).await?;
        Ok(path)
    }

    /// Pick the next backlog feature for the given branch (or unassigned
    /// features on the main worktree when `branch` is `None`).
    pub fn pick_next(&self, project_path: &Path, branch: Option<&str>) -> Result<Option<FeatureId>, Error> {
        let list = self.store.load(project_path)?;
        let resolution = self.resolver.resolve(&list);

        for feature_id in &resolution.ordered {
            let Some(feature) = list.get(feature_id) else { continue };
            if feature.status != FeatureStatus::Backlog {
                continue;
            }
            let matches_branch = match branch {
                Some(b) => feature.branch_name.as_deref() == Some(b),
                None => feature.branch_name.is_none(),
            };
            if !matches_branch {
                continue;
            }
            if self.config.enable_dependency_blocking {
                if !self.resolver.blocking_dependencies(feature, &list).is_empty() {
                    continue;
                }
            }
            return Ok(Some(feature_id.clone()));
        }
        Ok(None)
    }

    /// Begin autonomous iteration over a project's backlog. Fails if
    /// already running for this project path.
    pub fn start_loop(self: Arc<Self>, project_path: PathBuf) -> Result<(), Error> {
        let mut loops = self.loops.lock();
        if loops.contains_key(&project_path) {
            return Err(Error::state(format!("loop already running for {}", project_path.display())));
        }
        let running = Arc::new(AtomicBool::new(true));
        let scheduler = self.clone();
        let flag = running.clone();
        let path = project_path.clone();
        let handle = tokio::spawn(async move {
            loop {
                if !flag.load(Ordering::SeqCst) {
                    break;
                }
                if !scheduler.can_start() {
                    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
                    continue;
                }
                match scheduler.pick_next(&path, None) {
                    Ok(Some(feature_id)) => {
                        if let Err(error) =
                            scheduler.run_feature(&path, &feature_id, true, None).await
                        {
                            tracing::warn!(%error, feature_id = %feature_id, "loop run failed");
                        }
                    }
                    Ok(None) => {
                        tracing::info!(project = %path.display(), "all features completed");
                        break;
                    }
                    Err(error) => {
                        tracing::warn!(%error, "loop failed to load feature list");
                        break;
                    }
                }
            }
        });
        loops.insert(project_path, (running, handle));
        Ok(())
    }

    /// Stop the outer loop; in-flight runs continue unless also cancelled
    /// individually. Idempotent.
    pub fn stop_loop(&self, project_path: &Path) {
        if let Some((running, _)) = self.loops.lock().remove(project_path) {
            running.store(false, Ordering::SeqCst);
        }
    }

    /// At startup, reset any feature stuck `in_progress` with no live
    /// runner and a `startedAt` older than the configured staleness
    /// threshold back to `backlog` so the loop can retry it.
    pub fn reconcile_on_startup(&self, project_path: &Path) -> Result<usize, Error> {
        let list = self.store.load(project_path)?;
        let now = self.clock.epoch_ms();
        let live: std::collections::HashSet<FeatureId> = self.runs.lock().keys().cloned().collect();

        let mut reconciled = 0;
        for feature in list.iter() {
            if feature.status != FeatureStatus::InProgress || live.contains(&feature.id) {
                continue;
            }
            let started_at_ms = feature.started_at.as_deref().and_then(parse_iso8601).unwrap_or(0);
            if now.saturating_sub(started_at_ms) < self.config.stale_after_ms {
                continue;
            }
            self.store.update(
                project_path,
                &feature.id,
                FeaturePatch { status: Some(FeatureStatus::Backlog), ..Default::default() },
            )?;
            self.events.publish(ActivityEvent::Error {
                feature_id: feature.id.clone(),
                timestamp_ms: now,
                message: "reconciled stale in_progress feature after restart".to_string(),
            });
            reconciled += 1;
        }
        Ok(reconciled)
    }
}

fn iso8601(epoch_ms: u64) -> String {
    chrono::DateTime::from_timestamp_millis(epoch_ms as i64)
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_default()
}

fn parse_iso8601(value: &str) -> Option<u64> {
    chrono::DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.timestamp_millis().max(0) as u64)
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
