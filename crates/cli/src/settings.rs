// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resolves the merged environment attached to every spawned LLM/git
//! subprocess. Precedence, highest first: CLI flags, process environment,
//! `~/.claude/settings.json`'s `env` map, built-in defaults.

use std::collections::HashMap;
use std::path::PathBuf;

const KNOWN_VARS: &[&str] =
    &["ANTHROPIC_API_KEY", "CLAUDE_CODE_OAUTH_TOKEN", "GOOGLE_API_KEY", "CORS_ORIGIN", "PORT"];

#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub env: HashMap<String, String>,
}

impl Settings {
    /// Builds the merged environment. `cli_env` holds values parsed from
    /// `--set KEY=VALUE` flags and wins over everything else.
    pub fn load(cli_env: &HashMap<String, String>) -> Self {
        let mut env = HashMap::new();

        if let Some(path) = settings_file_path() {
            if let Some(from_file) = read_settings_file_env(&path) {
                env.extend(from_file);
            }
        }

        for key in KNOWN_VARS {
            if let Ok(value) = std::env::var(key) {
                env.insert((*key).to_string(), value);
            }
        }

        env.extend(cli_env.clone());
        Self { env }
    }
}

fn settings_file_path() -> Option<PathBuf> {
    dirs_home().map(|home| home.join(".claude").join("settings.json"))
}

fn dirs_home() -> Option<PathBuf> {
    std::env::var_os("HOME").map(PathBuf::from)
}

/// Only the top-level `env` object is honored; everything else in the
/// settings file is ignored by this crate.
fn read_settings_file_env(path: &std::path::Path) -> Option<HashMap<String, String>> {
    let contents = std::fs::read_to_string(path).ok()?;
    let value: serde_json::Value = serde_json::from_str(&contents).ok()?;
    let env = value.get("env")?.as_object()?;
    Some(
        env.iter()
            .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
            .collect(),
    )
}

#[cfg(test)]
#[path = "settings_tests.rs"]
mod tests;
