// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pull request creation: prefers the `gh` CLI when present and
//! authenticated, otherwise synthesizes a pre-filled compare URL.

use crate::git;
use automaker_core::Error;
use std::path::Path;
use tokio::process::Command;

pub struct PrRequest<'a> {
    pub title: &'a str,
    pub body: &'a str,
    pub base: &'a str,
    pub draft: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrOutcome {
    Created { url: String },
    FallbackUrl { url: String },
}

/// Probe for a usable `gh` installation: present on PATH and authenticated.
pub async fn has_gh_cli() -> bool {
    let version_ok = Command::new("gh").arg("--version").output().await.map(|o| o.status.success()).unwrap_or(false);
    if !version_ok {
        return false;
    }
    Command::new("gh")
        .args(["auth", "status"])
        .output()
        .await
        .map(|o| o.status.success())
        .unwrap_or(false)
}

/// Pushes `branch_name`, then either invokes `gh pr create` or synthesizes
/// a fallback compare URL. Never returns an error for a missing/
/// unauthenticated `gh` — that's the documented degraded path.
pub async fn create_pr(
    worktree_path: &Path,
    branch_name: &str,
    request: PrRequest<'_>,
) -> Result<PrOutcome, Error> {
    git::run(worktree_path, &["push", "-u", "origin", branch_name]).await?;

    if has_gh_cli().await {
        let mut args = vec!["pr", "create", "--title", request.title, "--body", request.body, "--base", request.base];
        if request.draft {
            args.push("--draft");
        }
        let output = Command::new("gh")
            .args(&args)
            .current_dir(worktree_path)
            .output()
            .await
            .map_err(|e| Error::git(automaker_core::error::GitErrorKind::Other, e.to_string()))?;
        if output.status.success() {
            let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
            return Ok(PrOutcome::Created { url });
        }
        tracing::warn!(
            stderr = %String::from_utf8_lossy(&output.stderr),
            "gh pr create failed, falling back to compare URL"
        );
    }

    let url = synthesize_compare_url(worktree_path, branch_name, request.base, request.title, request.body).await?;
    Ok(PrOutcome::FallbackUrl { url })
}

async fn synthesize_compare_url(
    worktree_path: &Path,
    branch_name: &str,
    base: &str,
    title: &str,
    body: &str,
) -> Result<String, Error> {
    let remote_url = git::run(worktree_path, &["remote", "get-url", "origin"]).await?;
    let (owner, repo) = parse_owner_repo(&remote_url)
        .ok_or_else(|| Error::state(format!("could not parse owner/repo from remote {remote_url:?}")))?;
    let title_enc = urlencode(title);
    let body_enc = urlencode(body);
    Ok(format!(
        "https://github.com/{owner}/{repo}/compare/{base}...{branch_name}?expand=1&title={title_enc}&body={body_enc}"
    ))
}

/// Accepts `git@github.com:owner/repo.git` and `https://github.com/owner/repo.git` forms.
fn parse_owner_repo(remote_url: &str) -> Option<(String, String)> {
    let trimmed = remote_url.trim().trim_end_matches(".git");
    let path = trimmed.rsplit_once("github.com").map(|(_, rest)| rest)?;
    let path = path.trim_start_matches([':', '/']);
    let (owner, repo) = path.split_once('/')?;
    Some((owner.to_string(), repo.to_string()))
}

fn urlencode(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

#[cfg(test)]
#[path = "pr_tests.rs"]
mod tests;
