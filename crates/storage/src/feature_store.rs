// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Durable, crash-safe source of truth for a project's feature list.

use crate::atomic::{read_json_opt, write_json_atomic};
use automaker_core::{Clock, Error, Feature, FeatureId, FeatureList};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A partial update applied to one feature. `None` means "leave as is";
/// wrapping a field in `Some` (including `Some(None)` for optionals) sets
/// it explicitly.
#[derive(Debug, Default, Clone)]
pub struct FeaturePatch {
    pub status: Option<automaker_core::FeatureStatus>,
    pub started_at: Option<Option<String>>,
    pub just_finished_at: Option<Option<String>>,
    pub worktree_path: Option<Option<String>>,
    pub branch_name: Option<Option<String>>,
    pub priority: Option<i64>,
}

impl FeaturePatch {
    fn apply(self, feature: &mut Feature) {
        if let Some(status) = self.status {
            feature.status = status;
        }
        if let Some(v) = self.started_at {
            feature.started_at = v;
        }
        if let Some(v) = self.just_finished_at {
            feature.just_finished_at = v;
        }
        if let Some(v) = self.worktree_path {
            feature.worktree_path = v;
        }
        if let Some(v) = self.branch_name {
            feature.branch_name = v;
        }
        if let Some(v) = self.priority {
            feature.priority = v;
        }
    }
}

/// One mutex per project path, handed out from a shared registry so two
/// `FeatureStore` handles pointed at the same project still serialize.
#[derive(Default)]
struct LockRegistry {
    locks: Mutex<HashMap<PathBuf, Arc<Mutex<()>>>>,
}

impl LockRegistry {
    fn lock_for(&self, project_path: &Path) -> Arc<Mutex<()>> {
        self.locks
            .lock()
            .entry(project_path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

pub struct FeatureStore<C: Clock> {
    clock: C,
    registry: Arc<LockRegistry>,
}

impl<C: Clock> FeatureStore<C> {
    pub fn new(clock: C) -> Self {
        Self { clock, registry: Arc::new(LockRegistry::default()) }
    }

    fn list_path(project_path: &Path) -> PathBuf {
        project_path.join(".automaker").join("feature_list.json")
    }

    /// Missing file yields an empty list, not an error.
    pub fn load(&self, project_path: &Path) -> Result<FeatureList, Error> {
        let path = Self::list_path(project_path);
        let mut list = read_json_opt::<FeatureList>(&path)?.unwrap_or_default();
        list.backfill_missing_ids(self.clock.epoch_ms());
        Ok(list)
    }

    fn save(&self, project_path: &Path, list: &FeatureList) -> Result<(), Error> {
        write_json_atomic(&Self::list_path(project_path), list)
    }

    /// Reload from disk under the project's lock, apply `f`, persist, and
    /// return what `f` returned. Any failure to persist leaves the prior
    /// on-disk state untouched and does not update via a cache, so the
    /// next reader re-converges on disk truth.
    fn with_locked_list<T>(
        &self,
        project_path: &Path,
        f: impl FnOnce(&mut FeatureList) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let lock = self.registry.lock_for(project_path);
        let _guard = lock.lock();
        let mut list = self.load(project_path)?;
        let result = f(&mut list)?;
        self.save(project_path, &list)?;
        Ok(result)
    }

    pub fn update(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        patch: FeaturePatch,
    ) -> Result<Feature, Error> {
        self.with_locked_list(project_path, |list| {
            let feature = list
                .get_mut(feature_id)
                .ok_or_else(|| Error::not_found(format!("feature {feature_id}")))?;
            patch.apply(feature);
            Ok(feature.clone())
        })
    }

    pub fn create(&self, project_path: &Path, feature: Feature) -> Result<Feature, Error> {
        self.with_locked_list(project_path, |list| {
            list.push(feature.clone());
            Ok(feature)
        })
    }

    pub fn delete(&self, project_path: &Path, feature_id: &FeatureId) -> Result<Feature, Error> {
        self.with_locked_list(project_path, |list| {
            list.remove(feature_id).ok_or_else(|| Error::not_found(format!("feature {feature_id}")))
        })
    }

    pub fn move_before(
        &self,
        project_path: &Path,
        feature_id: &FeatureId,
        anchor_id: &FeatureId,
    ) -> Result<(), Error> {
        self.with_locked_list(project_path, |list| {
            list.move_before(feature_id, anchor_id);
            Ok(())
        })
    }
}

#[cfg(test)]
#[path = "feature_store_tests.rs"]
mod tests;
