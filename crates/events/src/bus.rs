// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-feature publish/subscribe of [`ActivityEvent`]s. Publishing is
//! non-blocking: a slow subscriber only loses its own oldest buffered
//! events, it never backpressures the publisher.

use automaker_core::event::ActivityEvent;
use automaker_core::feature::FeatureId;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

const DEFAULT_REPLAY_CAPACITY: usize = 200;
const DEFAULT_LIVE_CAPACITY: usize = 256;

struct FeatureChannel {
    replay: Mutex<VecDeque<ActivityEvent>>,
    sender: broadcast::Sender<ActivityEvent>,
    dropped: Arc<AtomicU64>,
}

impl FeatureChannel {
    fn new(replay_capacity: usize, live_capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(live_capacity);
        Self {
            replay: Mutex::new(VecDeque::with_capacity(replay_capacity)),
            sender,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }
}

/// Fan-out event publisher, one logical channel per feature id.
pub struct EventBus {
    channels: Mutex<HashMap<FeatureId, Arc<FeatureChannel>>>,
    replay_capacity: usize,
    live_capacity: usize,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_REPLAY_CAPACITY, DEFAULT_LIVE_CAPACITY)
    }
}

impl EventBus {
    pub fn new(replay_capacity: usize, live_capacity: usize) -> Self {
        Self { channels: Mutex::new(HashMap::new()), replay_capacity, live_capacity }
    }

    fn channel_for(&self, feature_id: &FeatureId) -> Arc<FeatureChannel> {
        self.channels
            .lock()
            .entry(feature_id.clone())
            .or_insert_with(|| Arc::new(FeatureChannel::new(self.replay_capacity, self.live_capacity)))
            .clone()
    }

    /// Publish `event`. Never blocks: if no subscribers are attached, the
    /// event is retained only in the replay buffer.
    pub fn publish(&self, event: ActivityEvent) {
        let channel = self.channel_for(event.feature_id());
        {
            let mut replay = channel.replay.lock();
            if replay.len() == self.replay_capacity {
                replay.pop_front();
            }
            replay.push_back(event.clone());
        }
        // No active receivers is not an error; the event is still buffered.
        let _ = channel.sender.send(event);
    }

    /// Subscribe to a feature's events: replays up to `replay_capacity`
    /// buffered events, then streams live ones.
    pub fn subscribe(&self, feature_id: &FeatureId) -> EventSubscription {
        let channel = self.channel_for(feature_id);
        let replay: VecDeque<ActivityEvent> = channel.replay.lock().clone();
        let receiver = channel.sender.subscribe();
        EventSubscription { replay, receiver, dropped: channel.dropped.clone() }
    }

    /// Drop the buffered state for a feature once its run is fully drained
    /// and no further events are expected.
    pub fn forget(&self, feature_id: &FeatureId) {
        self.channels.lock().remove(feature_id);
    }
}

/// A live cursor into one feature's event stream: first drains the replay
/// backlog, then yields events as they're published.
pub struct EventSubscription {
    replay: VecDeque<ActivityEvent>,
    receiver: broadcast::Receiver<ActivityEvent>,
    dropped: Arc<AtomicU64>,
}

impl EventSubscription {
    /// Total events this subscriber has missed because its buffer was
    /// full when they were published.
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    /// Await the next event. Returns `None` only if the bus itself (and
    /// every other subscriber reference) has been dropped.
    pub async fn next(&mut self) -> Option<ActivityEvent> {
        if let Some(event) = self.replay.pop_front() {
            return Some(event);
        }
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    self.dropped.fetch_add(skipped, Ordering::Relaxed);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[path = "bus_tests.rs"]
mod tests;
