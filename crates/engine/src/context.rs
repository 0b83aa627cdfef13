// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Append-only transcript of one feature's run, written to
//! `.automaker/context/<featureId>.md` alongside the feature list.

use automaker_core::{Error, FeatureId};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

pub struct ContextWriter {
    path: PathBuf,
}

impl ContextWriter {
    pub fn path_for(project_path: &Path, feature_id: &FeatureId) -> PathBuf {
        project_path.join(".automaker").join("context").join(format!("{feature_id}.md"))
    }

    pub async fn open(project_path: &Path, feature_id: &FeatureId) -> Result<Self, Error> {
        let path = Self::path_for(project_path, feature_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| Error::Persistence { path: path.clone(), source })?;
        }
        Ok(Self { path })
    }

    pub async fn append(&self, line: &str) -> Result<(), Error> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| Error::Persistence { path: self.path.clone(), source })?;
        file.write_all(line.as_bytes())
            .await
            .map_err(|source| Error::Persistence { path: self.path.clone(), source })?;
        file.write_all(b"\n").await.map_err(|source| Error::Persistence {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "context_tests.rs"]
mod tests;
