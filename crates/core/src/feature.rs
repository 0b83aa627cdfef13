// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The feature: the atomic unit of work the scheduler drives through its
//! plan/act/verify loop, and the list that holds them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Stable identifier for a feature within a project's feature list.
///
/// Unlike [`crate::id`]'s nanoid-backed ids, a `FeatureId` is either
/// author-supplied (loaded verbatim from JSON) or minted deterministically
/// as `feature-<index>-<load_timestamp_ms>` for entries an older file left
/// unidentified, so re-loading the same file twice never changes an id that
/// was already present.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureId(pub String);

impl FeatureId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a deterministic id for a feature whose original file carried
    /// none. Stable across repeated loads of the same file at the same
    /// `load_timestamp_ms` because both inputs come from the file itself.
    pub fn mint(index: usize, load_timestamp_ms: u64) -> Self {
        Self(format!("feature-{index}-{load_timestamp_ms}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FeatureId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FeatureId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for FeatureId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Where a feature sits in the plan/act/verify state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureStatus {
    Backlog,
    InProgress,
    WaitingApproval,
    Verified,
    Completed,
}

crate::simple_display! {
    FeatureStatus {
        Backlog => "backlog",
        InProgress => "in_progress",
        WaitingApproval => "waiting_approval",
        Verified => "verified",
        Completed => "completed",
    }
}

impl FeatureStatus {
    /// A feature is actively owned by a live runner only in this status;
    /// every other status means no runner should be touching it.
    pub fn is_running_eligible(self) -> bool {
        matches!(self, FeatureStatus::InProgress)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, FeatureStatus::Verified | FeatureStatus::Completed)
    }
}

/// How hard the model should think before acting. Forwarded to the LLM
/// transport's `options.thinkingLevel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingLevel {
    #[default]
    None,
    Low,
    Medium,
    High,
}

crate::simple_display! {
    ThinkingLevel {
        None => "none",
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// A single attached reference image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub path: String,
    pub filename: String,
}

/// A user-authored unit of work describable to the agent.
///
/// Unknown fields round-trip verbatim through `extra` so an older or newer
/// client's additions to `feature_list.json` are never silently dropped on
/// save, per the on-disk forward-compatibility contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feature {
    pub id: FeatureId,
    pub category: String,
    pub description: String,
    #[serde(default)]
    pub steps: Vec<String>,
    pub status: FeatureStatus,
    #[serde(default)]
    pub skip_tests: bool,
    pub model: String,
    #[serde(default)]
    pub thinking_level: ThinkingLevel,
    #[serde(default)]
    pub image_paths: Vec<ImageRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub worktree_path: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default)]
    pub dependencies: BTreeSet<FeatureId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub just_finished_at: Option<String>,

    /// Catch-all for fields this crate doesn't model, preserved byte-for-
    /// byte across load/save so legacy or newer-client fields survive.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_priority() -> i64 {
    999
}

impl Feature {
    /// Dependencies that are not yet verified or completed, given the rest
    /// of the list they belong to.
    pub fn blocking_dependencies<'a>(
        &'a self,
        all: &'a FeatureList,
    ) -> Vec<&'a FeatureId> {
        self.dependencies
            .iter()
            .filter(|dep_id| {
                all.get(dep_id).map(|f| !f.status.is_terminal()).unwrap_or(false)
            })
            .collect()
    }
}

#[cfg(any(test, feature = "test-support"))]
crate::builder! {
    pub struct FeatureBuilder => Feature {
        into {
            id: FeatureId = FeatureId::new("feature-test"),
            category: String = "Core",
            description: String = "do the thing",
            model: String = "claude-sonnet-4-5",
        }
        set {
            status: FeatureStatus = FeatureStatus::Backlog,
            skip_tests: bool = false,
            thinking_level: ThinkingLevel = ThinkingLevel::None,
            priority: i64 = 999,
            steps: Vec<String> = Vec::new(),
            image_paths: Vec<ImageRef> = Vec::new(),
            dependencies: BTreeSet<FeatureId> = BTreeSet::new(),
        }
        option {
            branch_name: String = None,
            worktree_path: String = None,
            started_at: String = None,
            just_finished_at: String = None,
        }
        computed {
            extra: serde_json::Map<String, serde_json::Value> = serde_json::Map::new(),
        }
    }
}

/// The full, ordered feature list of a project. On-disk order is
/// authoritative for tie-breaking equal-priority features.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeatureList {
    features: Vec<Feature>,
}

impl FeatureList {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Feature> {
        self.features.iter()
    }

    pub fn as_slice(&self) -> &[Feature] {
        &self.features
    }

    pub fn into_vec(self) -> Vec<Feature> {
        self.features
    }

    pub fn get(&self, id: &FeatureId) -> Option<&Feature> {
        self.features.iter().find(|f| &f.id == id)
    }

    pub fn get_mut(&mut self, id: &FeatureId) -> Option<&mut Feature> {
        self.features.iter_mut().find(|f| &f.id == id)
    }

    pub fn position(&self, id: &FeatureId) -> Option<usize> {
        self.features.iter().position(|f| &f.id == id)
    }

    pub fn push(&mut self, feature: Feature) {
        self.features.push(feature);
    }

    pub fn remove(&mut self, id: &FeatureId) -> Option<Feature> {
        let idx = self.position(id)?;
        Some(self.features.remove(idx))
    }

    /// Move `id` to just before `anchor` in on-disk order. No-op if either
    /// id is missing.
    pub fn move_before(&mut self, id: &FeatureId, anchor: &FeatureId) {
        let Some(from) = self.position(id) else { return };
        let feature = self.features.remove(from);
        let to = self.position(anchor).unwrap_or(self.features.len());
        self.features.insert(to, feature);
    }

    /// Assign deterministic ids to any feature loaded without one. Stable
    /// across repeated loads of the same file at the same timestamp.
    pub fn backfill_missing_ids(&mut self, load_timestamp_ms: u64) {
        for (index, feature) in self.features.iter_mut().enumerate() {
            if feature.id.as_str().is_empty() {
                feature.id = FeatureId::mint(index, load_timestamp_ms);
            }
        }
    }
}

#[cfg(test)]
#[path = "feature_tests.rs"]
mod tests;
