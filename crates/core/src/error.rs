// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator's single error taxonomy.
//!
//! Every component-local error type converts into this one at its public
//! boundary, so the scheduler is the only place that turns errors into
//! user-facing messages and events.

use std::path::PathBuf;
use thiserror::Error;

/// Why an LLM transport call failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Auth,
    Quota,
    Network,
    Server,
    Aborted,
    Other,
}

impl std::fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransportErrorKind::Auth => "auth",
            TransportErrorKind::Quota => "quota",
            TransportErrorKind::Network => "network",
            TransportErrorKind::Server => "server",
            TransportErrorKind::Aborted => "aborted",
            TransportErrorKind::Other => "other",
        })
    }
}

/// Why a git subprocess failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GitErrorKind {
    Missing,
    Dirty,
    Conflict,
    Other,
}

impl std::fmt::Display for GitErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            GitErrorKind::Missing => "missing",
            GitErrorKind::Dirty => "dirty",
            GitErrorKind::Conflict => "conflict",
            GitErrorKind::Other => "other",
        })
    }
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("concurrency limit reached ({running}/{max} runs active)")]
    ConcurrencyLimit { running: usize, max: usize },

    #[error("persistence error at {path}: {source}")]
    Persistence {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persistence error: malformed feature list at {path}: {source}")]
    PersistenceDecode {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("security error: {0}")]
    Security(String),

    #[error("transport error ({kind}): {message}")]
    Transport { kind: TransportErrorKind, message: String },

    #[error("git error ({kind}): {message}")]
    Git { kind: GitErrorKind, message: String },

    #[error("invalid state: {0}")]
    State(String),
}

impl Error {
    pub fn not_found(what: impl Into<String>) -> Self {
        Error::NotFound(what.into())
    }

    pub fn security(what: impl Into<String>) -> Self {
        Error::Security(what.into())
    }

    pub fn state(what: impl Into<String>) -> Self {
        Error::State(what.into())
    }

    pub fn transport(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        Error::Transport { kind, message: message.into() }
    }

    pub fn git(kind: GitErrorKind, message: impl Into<String>) -> Self {
        Error::Git { kind, message: message.into() }
    }

    /// True for errors where retrying the same operation immediately is
    /// pointless (the caller should surface them rather than loop).
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Error::Security(_)
                | Error::State(_)
                | Error::Transport { kind: TransportErrorKind::Auth, .. }
        )
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
