// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cooperative cancellation: one flag shared between the scheduler, the
//! LLM transport, and any subprocess a run spawned, plus cleanup hooks run
//! exactly once when the handle fires.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

type CleanupHook = Box<dyn FnOnce() + Send + 'static>;

struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
    hooks: Mutex<Vec<CleanupHook>>,
}

/// Cloneable cancellation signal for one run.
#[derive(Clone)]
pub struct CancellationHandle {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for CancellationHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationHandle")
            .field("cancelled", &self.inner.cancelled.load(Ordering::Relaxed))
            .finish()
    }
}

impl Default for CancellationHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancellationHandle {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cancelled: AtomicBool::new(false),
                notify: Notify::new(),
                hooks: Mutex::new(Vec::new()),
            }),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Register a hook to run the moment `cancel()` fires. If the handle
    /// is already cancelled, the hook runs immediately.
    pub fn on_cancel(&self, hook: impl FnOnce() + Send + 'static) {
        if self.is_cancelled() {
            hook();
            return;
        }
        self.inner.hooks.lock().push(Box::new(hook));
    }

    /// Fire the handle: flips the flag, wakes every waiter, and runs every
    /// registered cleanup hook exactly once. Idempotent.
    pub fn cancel(&self) {
        if self.inner.cancelled.swap(true, Ordering::SeqCst) {
            return;
        }
        self.inner.notify.notify_waiters();
        let hooks = std::mem::take(&mut *self.inner.hooks.lock());
        for hook in hooks {
            hook();
        }
    }

    /// Resolves once `cancel()` has been called. Poll this alongside the
    /// LLM stream/read to unblock quickly when a run is stopped.
    pub async fn cancelled(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.notify.notified().await;
    }
}

#[cfg(test)]
#[path = "cancellation_tests.rs"]
mod tests;
