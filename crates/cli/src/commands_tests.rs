// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_env_pair_splits_on_first_equals() {
    assert_eq!(parse_env_pair("KEY=value=with=equals").unwrap(), ("KEY".to_string(), "value=with=equals".to_string()));
}

#[test]
fn parse_env_pair_rejects_missing_equals() {
    assert!(parse_env_pair("no-equals-here").is_err());
}

#[test]
fn feature_id_of_extracts_id_from_feature_commands() {
    let run = Command::Run { feature_id: "f1".to_string(), use_worktrees: false };
    assert_eq!(feature_id_of(&run), Some(FeatureId::new("f1")));

    let status = Command::Status { format: OutputFormat::Text };
    assert_eq!(feature_id_of(&status), None);

    let start_loop = Command::StartLoop;
    assert_eq!(feature_id_of(&start_loop), None);
}
