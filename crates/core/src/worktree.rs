// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A worktree: an isolated working directory bound to one branch, sharing
//! the repository's object database with the main clone.

use serde::{Deserialize, Serialize};

/// One git worktree of a project, as reported by `git worktree list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Worktree {
    pub branch_name: String,
    pub path: String,
    pub is_new: bool,
    pub commits_ahead: u32,
    pub dirty: bool,
}

/// Lifecycle status surfaced while a worktree is being created or torn
/// down; transient, not persisted alongside the worktree list itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum WorktreeStatus {
    #[default]
    Creating,
    Ready,
    Removing,
    Failed {
        reason: String,
    },
}

impl std::fmt::Display for WorktreeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WorktreeStatus::Creating => write!(f, "creating"),
            WorktreeStatus::Ready => write!(f, "ready"),
            WorktreeStatus::Removing => write!(f, "removing"),
            WorktreeStatus::Failed { reason } => write!(f, "failed: {reason}"),
        }
    }
}

impl Worktree {
    pub fn is_main(&self) -> bool {
        self.branch_name == "main" || self.branch_name == "master"
    }
}

#[cfg(test)]
#[path = "worktree_tests.rs"]
mod tests;
