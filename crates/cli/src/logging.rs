// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Installs the global tracing subscriber once, at process start-up.

use tracing_subscriber::EnvFilter;

/// Configurable via `RUST_LOG`; defaults to `info` for this crate's own
/// spans and `warn` for dependencies.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,automaker_cli=info,automaker_engine=info"));

    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}
