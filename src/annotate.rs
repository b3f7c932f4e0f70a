//! Per-year costliest annotation
//!
//! Recomputed on every render pass: group records by year, find each group's
//! maximum cost, and flag every record whose cost equals that maximum. An
//! exact tie therefore flags more than one record per year; the winner set is
//! defined by equality against the computed maximum, not by a first-match
//! search.

use std::collections::BTreeMap;

use crate::records::DisasterRecord;

/// Set `is_costliest` on every record.
///
/// Records without a year belong to no group; records without a cost never
/// win. Stale flags from a previous pass are cleared.
pub fn mark_costliest(records: &mut [DisasterRecord]) {
    let mut max_by_year: BTreeMap<i32, f64> = BTreeMap::new();
    for record in records.iter() {
        if let (Some(year), Some(cost)) = (record.year, record.cost) {
            max_by_year
                .entry(year)
                .and_modify(|max| *max = max.max(cost))
                .or_insert(cost);
        }
    }

    for record in records.iter_mut() {
        record.is_costliest = match (record.year, record.cost) {
            (Some(year), Some(cost)) => max_by_year.get(&year) == Some(&cost),
            _ => false,
        };
    }
}
