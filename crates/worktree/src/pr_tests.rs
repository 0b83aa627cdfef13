// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn parse_owner_repo_handles_ssh_remote() {
    let (owner, repo) = parse_owner_repo("git@github.com:acme/widgets.git").unwrap();
    assert_eq!(owner, "acme");
    assert_eq!(repo, "widgets");
}

#[test]
fn parse_owner_repo_handles_https_remote() {
    let (owner, repo) = parse_owner_repo("https://github.com/acme/widgets.git").unwrap();
    assert_eq!(owner, "acme");
    assert_eq!(repo, "widgets");
}

#[test]
fn parse_owner_repo_rejects_non_github_remote() {
    assert_eq!(parse_owner_repo("https://gitlab.com/acme/widgets.git"), None);
}

#[test]
fn urlencode_escapes_spaces_and_punctuation() {
    assert_eq!(urlencode("add login & logout"), "add%20login%20%26%20logout");
}

#[test]
fn urlencode_leaves_safe_characters_untouched() {
    assert_eq!(urlencode("feature-login_v2.final~x"), "feature-login_v2.final~x");
}
