// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use std::collections::HashMap;

fn write_settings_file(home: &std::path::Path, contents: &str) {
    let dir = home.join(".claude");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join("settings.json"), contents).unwrap();
}

#[test]
#[serial]
fn settings_file_env_is_merged_in() {
    let home = tempfile::tempdir().unwrap();
    write_settings_file(home.path(), r#"{"env": {"ANTHROPIC_API_KEY": "from-file"}}"#);
    std::env::set_var("HOME", home.path());
    std::env::remove_var("ANTHROPIC_API_KEY");

    let settings = Settings::load(&HashMap::new());
    assert_eq!(settings.env.get("ANTHROPIC_API_KEY"), Some(&"from-file".to_string()));
}

#[test]
#[serial]
fn process_env_overrides_settings_file() {
    let home = tempfile::tempdir().unwrap();
    write_settings_file(home.path(), r#"{"env": {"ANTHROPIC_API_KEY": "from-file"}}"#);
    std::env::set_var("HOME", home.path());
    std::env::set_var("ANTHROPIC_API_KEY", "from-env");

    let settings = Settings::load(&HashMap::new());
    assert_eq!(settings.env.get("ANTHROPIC_API_KEY"), Some(&"from-env".to_string()));
    std::env::remove_var("ANTHROPIC_API_KEY");
}

#[test]
#[serial]
fn cli_flag_overrides_everything() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::set_var("ANTHROPIC_API_KEY", "from-env");

    let mut cli_env = HashMap::new();
    cli_env.insert("ANTHROPIC_API_KEY".to_string(), "from-flag".to_string());

    let settings = Settings::load(&cli_env);
    assert_eq!(settings.env.get("ANTHROPIC_API_KEY"), Some(&"from-flag".to_string()));
    std::env::remove_var("ANTHROPIC_API_KEY");
}

#[test]
#[serial]
fn missing_settings_file_is_not_an_error() {
    let home = tempfile::tempdir().unwrap();
    std::env::set_var("HOME", home.path());
    std::env::remove_var("ANTHROPIC_API_KEY");

    let settings = Settings::load(&HashMap::new());
    assert!(settings.env.get("ANTHROPIC_API_KEY").is_none());
}
