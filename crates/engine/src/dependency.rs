// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Topological ordering of a feature list and blocking-dependency queries.
//!
//! A cycle never aborts ordering: cycle members are appended in priority
//! order after every feature that could be placed acyclically.

use automaker_core::{Feature, FeatureId, FeatureList};
use std::collections::{HashMap, HashSet, VecDeque};

/// The result of ordering one feature list.
pub struct Resolution {
    pub ordered: Vec<FeatureId>,
    pub cycle_members: Vec<FeatureId>,
}

impl Resolution {
    pub fn has_cycle(&self) -> bool {
        !self.cycle_members.is_empty()
    }
}

/// Stateless: every call recomputes from the list handed in, since the list
/// itself is the only durable state and may change between calls.
#[derive(Default)]
pub struct DependencyResolver;

impl DependencyResolver {
    pub fn new() -> Self {
        Self
    }

    /// Dependencies of `feature` that are neither `verified` nor
    /// `completed`, per the full list they belong to.
    pub fn blocking_dependencies<'a>(
        &self,
        feature: &'a Feature,
        all: &'a FeatureList,
    ) -> Vec<&'a FeatureId> {
        feature.blocking_dependencies(all)
    }

    /// Kahn's algorithm over `dependencies` edges (dependency -> dependent),
    /// breaking ties by ascending `priority` then by on-disk order. Missing
    /// dependency ids are treated as already satisfied (no edge).
    pub fn resolve(&self, list: &FeatureList) -> Resolution {
        let on_disk_order: HashMap<&FeatureId, usize> =
            list.iter().enumerate().map(|(i, f)| (&f.id, i)).collect();

        let mut in_degree: HashMap<&FeatureId, usize> = HashMap::new();
        let mut dependents: HashMap<&FeatureId, Vec<&FeatureId>> = HashMap::new();
        for feature in list.iter() {
            in_degree.entry(&feature.id).or_insert(0);
            for dep in &feature.dependencies {
                if list.get(dep).is_none() {
                    continue;
                }
                *in_degree.entry(&feature.id).or_insert(0) += 1;
                dependents.entry(dep).or_default().push(&feature.id);
            }
        }

        let ready_key = |id: &FeatureId| {
            let feature = list.get(id).expect("id drawn from list");
            (feature.priority, on_disk_order.get(&feature.id).copied().unwrap_or(usize::MAX))
        };

        let mut ready: Vec<&FeatureId> =
            in_degree.iter().filter(|(_, deg)| **deg == 0).map(|(id, _)| *id).collect();
        ready.sort_by_key(|id| ready_key(id));
        let mut queue: VecDeque<&FeatureId> = ready.into();

        let mut ordered = Vec::with_capacity(list.len());
        let mut remaining = in_degree.clone();

        while let Some(id) = queue.pop_front() {
            ordered.push(id.clone());
            if let Some(next) = dependents.get(id) {
                let mut newly_ready = Vec::new();
                for dependent in next {
                    if let Some(degree) = remaining.get_mut(*dependent) {
                        *degree -= 1;
                        if *degree == 0 {
                            newly_ready.push(*dependent);
                        }
                    }
                }
                newly_ready.sort_by_key(|id| ready_key(id));
                for id in newly_ready {
                    queue.push_back(id);
                }
            }
        }

        let placed: HashSet<&FeatureId> = ordered.iter().collect();
        let mut cycle_members: Vec<&FeatureId> =
            list.iter().map(|f| &f.id).filter(|id| !placed.contains(id)).collect();
        cycle_members.sort_by_key(|id| ready_key(id));

        for id in &cycle_members {
            ordered.push((*id).clone());
        }

        Resolution {
            ordered,
            cycle_members: cycle_members.into_iter().cloned().collect(),
        }
    }
}

#[cfg(test)]
#[path = "dependency_tests.rs"]
mod tests;
