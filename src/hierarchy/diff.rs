//! Set difference between desired and current child references

use std::collections::BTreeSet;

use crate::types::{PortfolioKey, ReferenceDelta};

/// Compute the references to add and remove to turn `old` into `new`.
///
/// Pure function: `to_add` is every key in `new` not in `old`, `to_remove`
/// every key in `old` not in `new`. Each key lands in exactly one bucket, so
/// the buckets are disjoint. Results are ordered sets, so the outcome is
/// deterministic regardless of the input slice order.
pub fn diff_references(old: &[PortfolioKey], new: &[PortfolioKey]) -> ReferenceDelta {
    let old_set: BTreeSet<&PortfolioKey> = old.iter().collect();
    let new_set: BTreeSet<&PortfolioKey> = new.iter().collect();

    ReferenceDelta {
        to_add: new_set
            .difference(&old_set)
            .map(|key| (*key).clone())
            .collect(),
        to_remove: old_set
            .difference(&new_set)
            .map(|key| (*key).clone())
            .collect(),
    }
}
