// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use automaker_core::{Feature, FeatureId, FeatureStatus};
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};

fn feature(id: &str, priority: i64, deps: &[&str]) -> Feature {
    Feature::builder()
        .id(FeatureId::new(id))
        .priority(priority)
        .dependencies(deps.iter().map(|d| FeatureId::new(*d)).collect::<BTreeSet<_>>())
        .build()
}

#[test]
fn independent_features_order_by_priority_then_disk_order() {
    let list = FeatureList::new(vec![
        feature("b", 5, &[]),
        feature("a", 1, &[]),
        feature("c", 1, &[]),
    ]);
    let resolution = DependencyResolver::new().resolve(&list);
    assert!(!resolution.has_cycle());
    let ids: Vec<&str> = resolution.ordered.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["a", "c", "b"]);
}

#[test]
fn dependency_is_placed_before_dependent() {
    let list = FeatureList::new(vec![feature("downstream", 1, &["upstream"]), feature("upstream", 1, &[])]);
    let resolution = DependencyResolver::new().resolve(&list);
    let ids: Vec<&str> = resolution.ordered.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids, vec!["upstream", "downstream"]);
}

#[test]
fn cycle_members_are_appended_after_acyclic_predecessors() {
    let list = FeatureList::new(vec![
        feature("root", 1, &[]),
        feature("a", 2, &["b"]),
        feature("b", 3, &["a"]),
    ]);
    let resolution = DependencyResolver::new().resolve(&list);
    assert!(resolution.has_cycle());
    assert_eq!(resolution.cycle_members.len(), 2);
    let ids: Vec<&str> = resolution.ordered.iter().map(|id| id.as_str()).collect();
    assert_eq!(ids[0], "root");
    assert_eq!(resolution.ordered.len(), 3);
}

#[test]
fn missing_dependency_id_does_not_block() {
    let list = FeatureList::new(vec![feature("only", 1, &["ghost"])]);
    let resolution = DependencyResolver::new().resolve(&list);
    assert!(!resolution.has_cycle());
    assert_eq!(resolution.ordered, vec![FeatureId::new("only")]);
}

#[test]
fn blocking_dependencies_excludes_terminal_statuses() {
    let mut done = feature("done", 1, &[]);
    done.status = FeatureStatus::Verified;
    let mut pending = feature("pending", 1, &[]);
    pending.status = FeatureStatus::Backlog;
    let mut dependent = feature("dependent", 1, &["done", "pending"]);
    dependent.status = FeatureStatus::Backlog;
    let list = FeatureList::new(vec![done, pending, dependent.clone()]);

    let blocking = DependencyResolver::new().blocking_dependencies(&dependent, &list);
    assert_eq!(blocking, vec![&FeatureId::new("pending")]);
}

proptest! {
    /// Every node's dependency mask only references earlier indices, so the
    /// generated graph is acyclic by construction, and the resolver's output
    /// must place each dependency strictly before its dependent.
    #[test]
    fn resolver_output_is_a_linear_extension(masks in proptest::collection::vec(any::<u16>(), 1..=10)) {
        let n = masks.len();
        let features: Vec<Feature> = (0..n)
            .map(|i| {
                let deps: Vec<String> = (0..i)
                    .filter(|j| (masks[i] as usize >> j) & 1 == 1)
                    .map(|j| format!("n{j}"))
                    .collect();
                let dep_refs: Vec<&str> = deps.iter().map(String::as_str).collect();
                feature(&format!("n{i}"), 1, &dep_refs)
            })
            .collect();
        let list = FeatureList::new(features);
        let resolution = DependencyResolver::new().resolve(&list);

        prop_assert!(!resolution.has_cycle());
        prop_assert_eq!(resolution.ordered.len(), n);

        let position: HashMap<&FeatureId, usize> =
            resolution.ordered.iter().enumerate().map(|(i, id)| (id, i)).collect();
        for i in 0..n {
            for j in 0..i {
                if (masks[i] as usize >> j) & 1 == 1 {
                    let dep = FeatureId::new(format!("n{j}"));
                    let dependent = FeatureId::new(format!("n{i}"));
                    prop_assert!(position[&dep] < position[&dependent]);
                }
            }
        }
    }
}
