// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Recently used feature categories, bounded so the list stays a useful
//! autocomplete source rather than an unbounded history.

use crate::atomic::{read_json_opt, write_json_atomic};
use automaker_core::Error;
use std::path::{Path, PathBuf};

const MAX_CATEGORIES: usize = 32;

fn categories_path(project_path: &Path) -> PathBuf {
    project_path.join(".automaker").join("categories.json")
}

/// Record `category` as most-recently-used, evicting the oldest entry once
/// the bound is exceeded. Re-using an existing category moves it to the
/// front rather than duplicating it.
pub fn save_category(project_path: &Path, category: &str) -> Result<Vec<String>, Error> {
    let path = categories_path(project_path);
    let mut categories: Vec<String> = read_json_opt(&path)?.unwrap_or_default();
    categories.retain(|c| c != category);
    categories.insert(0, category.to_string());
    categories.truncate(MAX_CATEGORIES);
    write_json_atomic(&path, &categories)?;
    Ok(categories)
}

pub fn load_categories(project_path: &Path) -> Result<Vec<String>, Error> {
    Ok(read_json_opt(&categories_path(project_path))?.unwrap_or_default())
}

#[cfg(test)]
#[path = "categories_tests.rs"]
mod tests;
