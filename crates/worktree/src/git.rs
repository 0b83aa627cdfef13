// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Thin wrapper over the `git` binary on PATH, with PATH extended to cover
//! the install locations a shell's login profile would normally add but a
//! spawned child process doesn't inherit.

use automaker_core::error::GitErrorKind;
use automaker_core::Error;
use std::path::Path;
use tokio::process::Command;

fn extended_path() -> std::ffi::OsString {
    let existing = std::env::var_os("PATH").unwrap_or_default();
    let extra = if cfg!(windows) {
        vec![]
    } else {
        vec!["/opt/homebrew/bin", "/usr/local/bin"]
    };
    let home_local = dirs_local_bin();
    let mut parts: Vec<std::path::PathBuf> = extra.iter().map(std::path::PathBuf::from).collect();
    if let Some(home_local) = home_local {
        parts.push(home_local);
    }
    parts.extend(std::env::split_paths(&existing));
    std::env::join_paths(parts).unwrap_or(existing)
}

fn dirs_local_bin() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(|home| std::path::Path::new(&home).join(".local/bin"))
}

fn command(cwd: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new("git");
    cmd.args(args).current_dir(cwd).env("PATH", extended_path());
    cmd
}

/// Run a git subcommand, returning trimmed stdout on success.
pub async fn run(cwd: &Path, args: &[&str]) -> Result<String, Error> {
    let output = command(cwd, args).output().await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            Error::git(GitErrorKind::Missing, "git executable not found on PATH")
        } else {
            Error::git(GitErrorKind::Other, e.to_string())
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        let kind = classify_stderr(&stderr);
        return Err(Error::git(kind, stderr));
    }
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

fn classify_stderr(stderr: &str) -> GitErrorKind {
    let lower = stderr.to_ascii_lowercase();
    if lower.contains("conflict") {
        GitErrorKind::Conflict
    } else if lower.contains("not a git repository") || lower.contains("command not found") {
        GitErrorKind::Missing
    } else if lower.contains("uncommitted") || lower.contains("dirty") || lower.contains("local changes") {
        GitErrorKind::Dirty
    } else {
        GitErrorKind::Other
    }
}

#[cfg(test)]
#[path = "git_tests.rs"]
mod tests;
