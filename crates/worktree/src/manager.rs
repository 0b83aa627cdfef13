// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps a feature's target branch to an isolated working directory without
//! duplicating the repository.

use crate::git;
use crate::validation::{ensure_within_allowed_roots, validate_branch_name};
use automaker_core::{Error, Worktree};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex as AsyncMutex;

fn is_main_branch(branch: &str) -> bool {
    branch == "main" || branch == "master"
}

fn safe_branch_dirname(branch: &str) -> String {
    branch.replace('/', "-")
}

/// One mutex per project path; worktree creation/removal is serialized,
/// reads are lock-free.
#[derive(Default)]
pub struct WorktreeManager {
    locks: Mutex<HashMap<PathBuf, Arc<AsyncMutex<()>>>>,
}

impl WorktreeManager {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_for(&self, project_path: &Path) -> Arc<AsyncMutex<()>> {
        self.locks
            .lock()
            .entry(project_path.to_path_buf())
            .or_insert_with(|| Arc::new(AsyncMutex::new(())))
            .clone()
    }

    fn sibling_worktrees_dir(project_path: &Path) -> PathBuf {
        let project_name =
            project_path.file_name().map(|n| n.to_string_lossy().to_string()).unwrap_or_default();
        project_path
            .parent()
            .map(|parent| parent.join(".worktrees").join(project_name))
            .unwrap_or_else(|| project_path.join(".worktrees"))
    }

    fn allowed_roots(project_path: &Path) -> Vec<PathBuf> {
        vec![project_path.to_path_buf(), Self::sibling_worktrees_dir(project_path)]
    }

    /// Idempotent: repeated calls with the same branch return the same
    /// path. `main`/`master` always resolve to the project path itself.
    pub async fn ensure(
        &self,
        project_path: &Path,
        branch_name: &str,
    ) -> Result<(PathBuf, bool), Error> {
        if is_main_branch(branch_name) {
            return Ok((project_path.to_path_buf(), false));
        }
        validate_branch_name(branch_name)?;

        let lock = self.lock_for(project_path);
        let _guard = lock.lock().await;

        if let Some(existing) = self.find_worktree(project_path, branch_name).await? {
            return Ok((PathBuf::from(existing.path), false));
        }

        let target = Self::sibling_worktrees_dir(project_path).join(safe_branch_dirname(branch_name));
        ensure_within_allowed_roots(&target, &Self::allowed_roots(project_path))?;
        tokio::fs::create_dir_all(
            target.parent().ok_or_else(|| Error::state("worktree target has no parent"))?,
        )
        .await
        .map_err(|source| Error::Persistence { path: target.clone(), source })?;

        let branch_exists =
            git::run(project_path, &["rev-parse", "--verify", "--quiet", branch_name]).await.is_ok();
        let target_str = target.to_string_lossy().to_string();
        if branch_exists {
            git::run(project_path, &["worktree", "add", &target_str, branch_name]).await?;
        } else {
            git::run(project_path, &["worktree", "add", "-b", branch_name, &target_str]).await?;
        }

        Ok((target, true))
    }

    async fn find_worktree(
        &self,
        project_path: &Path,
        branch_name: &str,
    ) -> Result<Option<Worktree>, Error> {
        let worktrees = self.list(project_path).await?;
        Ok(worktrees.into_iter().find(|w| w.branch_name == branch_name))
    }

    /// Parses `git worktree list --porcelain`, enriched with per-worktree
    /// ahead-count and dirty status.
    pub async fn list(&self, project_path: &Path) -> Result<Vec<Worktree>, Error> {
        let raw = git::run(project_path, &["worktree", "list", "--porcelain"]).await?;
        let mut worktrees = Vec::new();
        let mut current_path: Option<String> = None;
        let mut current_branch: Option<String> = None;

        for line in raw.lines() {
            if let Some(path) = line.strip_prefix("worktree ") {
                if let (Some(path), Some(branch)) = (current_path.take(), current_branch.take()) {
                    worktrees.push((path, branch));
                }
                current_path = Some(path.to_string());
            } else if let Some(branch_ref) = line.strip_prefix("branch ") {
                current_branch = Some(
                    branch_ref.strip_prefix("refs/heads/").unwrap_or(branch_ref).to_string(),
                );
            } else if line == "detached" {
                current_branch = Some("HEAD".to_string());
            }
        }
        if let (Some(path), Some(branch)) = (current_path, current_branch) {
            worktrees.push((path, branch));
        }

        let mut result = Vec::with_capacity(worktrees.len());
        for (path, branch) in worktrees {
            let path_buf = PathBuf::from(&path);
            let commits_ahead = self.commits_ahead(&path_buf, project_path).await.unwrap_or(0);
            let dirty = self.is_dirty(&path_buf).await.unwrap_or(false);
            result.push(Worktree {
                branch_name: branch,
                path,
                is_new: false,
                commits_ahead,
                dirty,
            });
        }
        Ok(result)
    }

    async fn commits_ahead(&self, worktree_path: &Path, project_path: &Path) -> Result<u32, Error> {
        let base_branch = git::run(project_path, &["symbolic-ref", "--short", "HEAD"])
            .await
            .unwrap_or_else(|_| "main".to_string());
        let range = format!("{base_branch}..HEAD");
        let out = git::run(worktree_path, &["rev-list", "--count", &range]).await?;
        out.trim().parse().map_err(|_| Error::state("could not parse rev-list count"))
    }

    async fn is_dirty(&self, worktree_path: &Path) -> Result<bool, Error> {
        let out = git::run(worktree_path, &["status", "--porcelain"]).await?;
        Ok(!out.trim().is_empty())
    }

    /// Refuses to remove a worktree whose branch is in `protected_branches`
    /// unless `force`.
    pub async fn remove(
        &self,
        project_path: &Path,
        branch_name: &str,
        force: bool,
        protected_branches: &[String],
    ) -> Result<(), Error> {
        if !force && protected_branches.iter().any(|b| b == branch_name) {
            return Err(Error::state(format!(
                "branch {branch_name} has a live run; pass force to remove anyway"
            )));
        }
        let worktree = self
            .find_worktree(project_path, branch_name)
            .await?
            .ok_or_else(|| Error::not_found(format!("worktree for branch {branch_name}")))?;
        let mut args = vec!["worktree", "remove"];
        if force {
            args.push("--force");
        }
        args.push(&worktree.path);
        git::run(project_path, &args).await?;
        Ok(())
    }

    /// Stages all, commits, returns the short SHA. No-op (returns the
    /// current HEAD SHA) if the tree is clean.
    pub async fn commit(&self, worktree_path: &Path, message: &str) -> Result<String, Error> {
        if !self.is_dirty(worktree_path).await? {
            return git::run(worktree_path, &["rev-parse", "--short", "HEAD"]).await;
        }
        git::run(worktree_path, &["add", "-A"]).await?;
        git::run(worktree_path, &["commit", "-m", message]).await?;
        git::run(worktree_path, &["rev-parse", "--short", "HEAD"]).await
    }

    /// Checks out `branch_main` in the project path and merges `branch`
    /// into it with `--no-ff`.
    pub async fn merge_to_main(
        &self,
        project_path: &Path,
        branch_main: &str,
        branch_name: &str,
    ) -> Result<(), Error> {
        git::run(project_path, &["checkout", branch_main]).await?;
        git::run(project_path, &["merge", "--no-ff", branch_name]).await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "manager_tests.rs"]
mod tests;
