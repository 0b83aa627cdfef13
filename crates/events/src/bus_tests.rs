// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::feature::FeatureId;

fn progress(feature_id: &FeatureId, n: u64) -> ActivityEvent {
    ActivityEvent::Progress {
        feature_id: feature_id.clone(),
        timestamp_ms: n,
        message: format!("step {n}"),
    }
}

#[tokio::test]
async fn subscriber_replays_buffered_events_then_live() {
    let bus = EventBus::default();
    let feature_id = FeatureId::new("feature-1");
    bus.publish(progress(&feature_id, 1));
    bus.publish(progress(&feature_id, 2));

    let mut sub = bus.subscribe(&feature_id);
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 1);
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 2);

    bus.publish(progress(&feature_id, 3));
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 3);
}

#[tokio::test]
async fn events_for_different_features_do_not_interleave_in_one_subscription() {
    let bus = EventBus::default();
    let a = FeatureId::new("a");
    let b = FeatureId::new("b");
    bus.publish(progress(&a, 1));
    bus.publish(progress(&b, 1));
    bus.publish(progress(&a, 2));

    let mut sub = bus.subscribe(&a);
    assert_eq!(sub.next().await.unwrap().feature_id(), &a);
    assert_eq!(sub.next().await.unwrap().feature_id(), &a);
}

#[tokio::test]
async fn replay_buffer_drops_oldest_beyond_capacity() {
    let bus = EventBus::new(2, 16);
    let feature_id = FeatureId::new("feature-1");
    bus.publish(progress(&feature_id, 1));
    bus.publish(progress(&feature_id, 2));
    bus.publish(progress(&feature_id, 3));

    let mut sub = bus.subscribe(&feature_id);
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 2);
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 3);
}

#[tokio::test]
async fn forget_clears_replay_state_for_a_feature() {
    let bus = EventBus::default();
    let feature_id = FeatureId::new("feature-1");
    bus.publish(progress(&feature_id, 1));
    bus.forget(&feature_id);

    let mut sub = bus.subscribe(&feature_id);
    bus.publish(progress(&feature_id, 2));
    assert_eq!(sub.next().await.unwrap().timestamp_ms(), 2);
}
