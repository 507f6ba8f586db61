//! Profile collapsing for upstream producers.
//!
//! Matching runs over *distinct* profiles, not individual builds or runners:
//! a fleet of five hundred identically configured executors is one
//! capability profile with five hundred runner ids. These helpers collapse a
//! raw stream of values into distinct profiles, merging the identity sets of
//! values that compare equal.

use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::hash::Hash;

use picket_model::{BuildRequirement, RunnerCapability};

/// Collapse requirements into distinct profiles, merging `work_ids`.
///
/// Output preserves first-appearance order.
pub fn collapse_requirements<I>(requirements: I) -> Vec<BuildRequirement>
where
    I: IntoIterator<Item = BuildRequirement>,
{
    collapse(requirements, BuildRequirement::merged_with)
}

/// Collapse capabilities into distinct profiles, merging `runner_ids`.
///
/// Output preserves first-appearance order.
pub fn collapse_capabilities<I>(capabilities: I) -> Vec<RunnerCapability>
where
    I: IntoIterator<Item = RunnerCapability>,
{
    collapse(capabilities, RunnerCapability::merged_with)
}

fn collapse<T, I, F>(items: I, merge: F) -> Vec<T>
where
    T: Clone + Eq + Hash,
    I: IntoIterator<Item = T>,
    F: Fn(&T, &T) -> T,
{
    let mut index: HashMap<T, usize> = HashMap::new();
    let mut distinct: Vec<T> = Vec::new();

    for item in items {
        match index.entry(item.clone()) {
            Entry::Occupied(slot) => {
                let at = *slot.get();
                distinct[at] = merge(&distinct[at], &item);
            }
            Entry::Vacant(slot) => {
                slot.insert(distinct.len());
                distinct.push(item);
            }
        }
    }

    distinct
}
