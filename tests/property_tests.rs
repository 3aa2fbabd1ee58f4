//! Property-based tests using proptest
//!
//! These tests generate random inputs and operation sequences and verify
//! the queue's ordering laws against straightforward models: drains must
//! equal stable sorts, selection must equal sort-and-slice, and a merge of
//! sorted inputs must be their sorted interleaving.

use proptest::prelude::*;

use depq::{merge, nlargest, nsmallest, Depq, Locator};

/// Stable ascending order: priority, then insertion rank.
fn stable_ascending(values: &[i32]) -> Vec<(i32, usize)> {
    let mut tagged: Vec<(i32, usize)> = values.iter().copied().zip(0..).collect();
    tagged.sort_by_key(|&(p, i)| (p, i));
    tagged
}

/// Stable descending order: priority descending, insertion rank ascending.
fn stable_descending(values: &[i32]) -> Vec<(i32, usize)> {
    let mut tagged: Vec<(i32, usize)> = values.iter().copied().zip(0..).collect();
    tagged.sort_by_key(|&(p, i)| (std::cmp::Reverse(p), i));
    tagged
}

fn drain_min_law(values: Vec<i32>) -> Result<(), TestCaseError> {
    let mut q = Depq::new();
    for (i, p) in values.iter().enumerate() {
        q.insert(i, *p);
    }
    let mut drained = Vec::new();
    while let Some(loc) = q.delete_min_locator() {
        drained.push((loc.priority(), loc.value()));
    }
    let want: Vec<(i32, usize)> = stable_ascending(&values);
    prop_assert_eq!(drained, want);
    Ok(())
}

fn drain_max_law(values: Vec<i32>) -> Result<(), TestCaseError> {
    let mut q = Depq::new();
    for (i, p) in values.iter().enumerate() {
        q.insert(i, *p);
    }
    let mut drained = Vec::new();
    while let Some(loc) = q.delete_max_locator() {
        drained.push((loc.priority(), loc.value()));
    }
    let want: Vec<(i32, usize)> = stable_descending(&values);
    prop_assert_eq!(drained, want);
    Ok(())
}

/// Drives a queue and a naive model through the same operation sequence
/// and requires identical observable behavior at every step.
fn mixed_ops_law(ops: Vec<(u8, i32)>) -> Result<(), TestCaseError> {
    // model entry: (priority, subpriority, value)
    let mut model: Vec<(i32, u64, u32)> = Vec::new();
    let mut locs: Vec<Locator<u32, i32>> = Vec::new();
    let mut q: Depq<u32, i32> = Depq::new();
    let mut next = 0u32;

    for (op, p) in ops {
        match op % 6 {
            0 | 1 => {
                let loc = q.insert(next, p);
                let sub = loc.subpriority().unwrap_or(0);
                model.push((p, sub, next));
                locs.push(loc);
                next += 1;
            }
            2 => {
                let want = model
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, &(p, s, _))| (p, s))
                    .map(|(i, _)| i);
                match want {
                    Some(i) => {
                        let (_, _, v) = model.remove(i);
                        prop_assert_eq!(q.delete_min(), Some(v));
                    }
                    None => prop_assert_eq!(q.delete_min(), None),
                }
            }
            3 => {
                let want = model
                    .iter()
                    .enumerate()
                    .min_by_key(|&(_, &(p, s, _))| (std::cmp::Reverse(p), s))
                    .map(|(i, _)| i);
                match want {
                    Some(i) => {
                        let (_, _, v) = model.remove(i);
                        prop_assert_eq!(q.delete_max(), Some(v));
                    }
                    None => prop_assert_eq!(q.delete_max(), None),
                }
            }
            4 => {
                // priority update through the locator of the newest live element
                if let Some(entry) = model.last_mut() {
                    let value = entry.2;
                    let loc = locs.iter().find(|l| l.in_queue() && l.value() == value);
                    if let Some(loc) = loc {
                        q.update_priority(loc, p, None).map_err(|e| {
                            TestCaseError::fail(format!("update failed: {}", e))
                        })?;
                        entry.0 = p;
                    }
                }
            }
            _ => {
                // find_minmax must agree with the model extremes
                let min = model.iter().min_by_key(|&&(p, s, _)| (p, s)).copied();
                let max = model
                    .iter()
                    .min_by_key(|&&(p, s, _)| (std::cmp::Reverse(p), s))
                    .copied();
                let got = q.find_minmax();
                prop_assert_eq!(got, min.zip(max).map(|(a, b)| (a.2, b.2)));
            }
        }
        prop_assert_eq!(q.len(), model.len());
    }
    Ok(())
}

fn locator_consistency_law(priorities: Vec<i32>) -> Result<(), TestCaseError> {
    let mut q = Depq::new();
    let locs: Vec<_> = priorities
        .iter()
        .enumerate()
        .map(|(i, p)| q.insert(i, *p))
        .collect();

    // churn the heap without touching the tracked locators
    q.find_minmax();

    for (i, loc) in locs.iter().enumerate() {
        prop_assert!(loc.in_queue());
        prop_assert_eq!(loc.value(), i);
        prop_assert_eq!(loc.priority(), priorities[i]);
        prop_assert_eq!(loc.subpriority(), Some(i as u64));
    }

    // deleting through the handle snapshots its fields
    for (i, loc) in locs.iter().enumerate() {
        q.delete_locator(loc)
            .map_err(|e| TestCaseError::fail(format!("delete failed: {}", e)))?;
        prop_assert!(!loc.in_queue());
        prop_assert_eq!(loc.priority(), priorities[i]);
        prop_assert_eq!(loc.subpriority(), Some(i as u64));
    }
    prop_assert!(q.is_empty());
    Ok(())
}

fn update_round_trip_law(
    start: (i32, i32),
    update: (i32, i32),
    sub: Option<u64>,
) -> Result<(), TestCaseError> {
    let mut q = Depq::new();
    let loc = q.insert(start.0, start.1);
    let original_sub = loc.subpriority();
    q.update(&loc, update.0, update.1, sub)
        .map_err(|e| TestCaseError::fail(format!("update failed: {}", e)))?;
    prop_assert_eq!(loc.value(), update.0);
    prop_assert_eq!(loc.priority(), update.1);
    // attached update with no subpriority keeps the old one
    prop_assert_eq!(loc.subpriority(), sub.or(original_sub));
    Ok(())
}

fn selection_law(k: usize, values: Vec<i32>) -> Result<(), TestCaseError> {
    let mut sorted = values.clone();
    sorted.sort();
    let lo = sorted[..k.min(sorted.len())].to_vec();
    let hi = sorted[sorted.len() - k.min(sorted.len())..].to_vec();
    prop_assert_eq!(nsmallest(k, values.iter().copied()), lo);
    prop_assert_eq!(nlargest(k, values), hi);
    Ok(())
}

fn merge_law(mut sources: Vec<Vec<i32>>) -> Result<(), TestCaseError> {
    for s in &mut sources {
        s.sort();
    }
    let mut want: Vec<i32> = sources.iter().flatten().copied().collect();
    want.sort();
    let got: Vec<i32> = merge(sources).collect();
    prop_assert_eq!(got, want);
    Ok(())
}

proptest! {
    #[test]
    fn prop_sorted_drain_min(values in prop::collection::vec(-50i32..50, 0..200)) {
        drain_min_law(values)?;
    }

    #[test]
    fn prop_sorted_drain_max(values in prop::collection::vec(-50i32..50, 0..200)) {
        drain_max_law(values)?;
    }

    #[test]
    fn prop_sorted_drain_heavy_ties(values in prop::collection::vec(0i32..4, 0..120)) {
        drain_min_law(values.clone())?;
        drain_max_law(values)?;
    }

    #[test]
    fn prop_mixed_ops_match_model(ops in prop::collection::vec((0u8..6, -20i32..20), 0..300)) {
        mixed_ops_law(ops)?;
    }

    #[test]
    fn prop_locator_consistency(priorities in prop::collection::vec(-10i32..10, 0..80)) {
        locator_consistency_law(priorities)?;
    }

    #[test]
    fn prop_update_round_trip(
        start in (-100i32..100, -100i32..100),
        update in (-100i32..100, -100i32..100),
        sub in prop::option::of(0u64..1000),
    ) {
        update_round_trip_law(start, update, sub)?;
    }

    #[test]
    fn prop_selection_matches_sort(
        k in 0usize..40,
        values in prop::collection::vec(-100i32..100, 0..300),
    ) {
        selection_law(k, values)?;
    }

    #[test]
    fn prop_merge_is_sorted_permutation(
        sources in prop::collection::vec(prop::collection::vec(-50i32..50, 0..40), 0..8),
    ) {
        merge_law(sources)?;
    }
}
