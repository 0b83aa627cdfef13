// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! A project: the repository root the scheduler operates against.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

crate::define_id! {
    /// Unique identifier for a registered project.
    pub struct ProjectId("prj-");
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub path: PathBuf,
    pub branch_main: String,
}

impl Project {
    pub fn new(path: impl Into<PathBuf>, branch_main: impl Into<String>) -> Self {
        Self { id: ProjectId::new(), path: path.into(), branch_main: branch_main.into() }
    }

    /// Path to the project's `.automaker` state directory.
    pub fn state_dir(&self) -> PathBuf {
        self.path.join(".automaker")
    }

    pub fn feature_list_path(&self) -> PathBuf {
        self.state_dir().join("feature_list.json")
    }

    pub fn categories_path(&self) -> PathBuf {
        self.state_dir().join("categories.json")
    }

    pub fn context_dir(&self) -> PathBuf {
        self.state_dir().join("context")
    }
}

#[cfg(test)]
#[path = "project_tests.rs"]
mod tests;
