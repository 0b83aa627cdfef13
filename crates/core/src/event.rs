// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Structured activity events published by a running feature and consumed
//! by the event bus's subscribers.

use crate::feature::FeatureId;
use serde::{Deserialize, Serialize};

/// Coarse progress signal during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Planning,
    Action,
    Verification,
}

crate::simple_display! {
    Phase {
        Planning => "planning",
        Action => "action",
        Verification => "verification",
    }
}

/// One event in a feature's run. Tagged by `type` so clients can decode
/// without knowing the variant set up front; unrecognized variants are
/// never produced by this crate but the tag makes the wire shape explicit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ActivityEvent {
    #[serde(rename = "feature:start")]
    Start { feature_id: FeatureId, timestamp_ms: u64 },

    #[serde(rename = "feature:phase")]
    Phase { feature_id: FeatureId, timestamp_ms: u64, phase: Phase },

    #[serde(rename = "feature:progress")]
    Progress { feature_id: FeatureId, timestamp_ms: u64, message: String },

    #[serde(rename = "feature:tool")]
    Tool {
        feature_id: FeatureId,
        timestamp_ms: u64,
        tool: String,
        input: serde_json::Value,
    },

    #[serde(rename = "feature:complete")]
    Complete {
        feature_id: FeatureId,
        timestamp_ms: u64,
        passes: bool,
        message: Option<String>,
    },

    #[serde(rename = "feature:error")]
    Error { feature_id: FeatureId, timestamp_ms: u64, message: String },
}

impl ActivityEvent {
    pub fn feature_id(&self) -> &FeatureId {
        match self {
            ActivityEvent::Start { feature_id, .. }
            | ActivityEvent::Phase { feature_id, .. }
            | ActivityEvent::Progress { feature_id, .. }
            | ActivityEvent::Tool { feature_id, .. }
            | ActivityEvent::Complete { feature_id, .. }
            | ActivityEvent::Error { feature_id, .. } => feature_id,
        }
    }

    pub fn timestamp_ms(&self) -> u64 {
        match self {
            ActivityEvent::Start { timestamp_ms, .. }
            | ActivityEvent::Phase { timestamp_ms, .. }
            | ActivityEvent::Progress { timestamp_ms, .. }
            | ActivityEvent::Tool { timestamp_ms, .. }
            | ActivityEvent::Complete { timestamp_ms, .. }
            | ActivityEvent::Error { timestamp_ms, .. } => *timestamp_ms,
        }
    }

    /// A terminal event ends a run; no further events follow it for the
    /// same feature id (per the event-pairing invariant).
    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivityEvent::Complete { .. } | ActivityEvent::Error { .. })
    }
}

#[cfg(test)]
#[path = "event_tests.rs"]
mod tests;
