//! Interval merging.
//!
//! Benefits of one employee are merged into maximal intervals, each carrying
//! the records that contributed to it. An interval with more than one member
//! means some of those records overlap.

use std::collections::BTreeMap;

use crate::models::{Benefit, BenefitId, EmployeeId};

/// A maximal span formed by overlapping inputs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedInterval<P, T> {
    /// Earliest start among the members.
    pub start: P,
    /// Latest end among the members.
    pub end: P,
    /// The inputs covered by this span, in start order.
    pub members: Vec<T>,
}

impl<P, T> MergedInterval<P, T> {
    /// Returns true if more than one input contributed to this span.
    pub fn has_overlap(&self) -> bool {
        self.members.len() > 1
    }
}

/// Merges `(start, end, item)` triples into maximal intervals.
///
/// Inputs overlap when `a.start < b.end && b.start < a.end`; inputs that only
/// touch (one ends exactly where the other starts) stay apart. Empty inputs
/// (`start >= end`) are dropped. The result is sorted and disjoint.
///
/// # Examples
///
/// ```
/// use benefit_engine::scheduling::merge_intervals;
///
/// let merged = merge_intervals(vec![(9, 12, "a"), (11, 14, "b"), (14, 17, "c")]);
/// assert_eq!(merged.len(), 2);
/// assert_eq!((merged[0].start, merged[0].end), (9, 14));
/// assert_eq!(merged[0].members, vec!["a", "b"]);
/// assert_eq!(merged[1].members, vec!["c"]);
/// ```
pub fn merge_intervals<P, T, I>(items: I) -> Vec<MergedInterval<P, T>>
where
    P: Ord + Copy,
    I: IntoIterator<Item = (P, P, T)>,
{
    let mut items: Vec<(P, P, T)> = items
        .into_iter()
        .filter(|(start, end, _)| start < end)
        .collect();
    items.sort_by(|a, b| a.0.cmp(&b.0));

    let mut merged: Vec<MergedInterval<P, T>> = Vec::new();
    for (start, end, item) in items {
        if let Some(last) = merged.last_mut()
            && start < last.end
        {
            last.end = last.end.max(end);
            last.members.push(item);
            continue;
        }
        merged.push(MergedInterval {
            start,
            end,
            members: vec![item],
        });
    }
    merged
}

/// Groups benefits by employee, keeping input order within each group.
pub fn group_by_employee(benefits: &[Benefit]) -> BTreeMap<EmployeeId, Vec<&Benefit>> {
    let mut groups: BTreeMap<EmployeeId, Vec<&Benefit>> = BTreeMap::new();
    for benefit in benefits {
        groups.entry(benefit.employee_id).or_default().push(benefit);
    }
    groups
}

/// Returns the groups of benefits that overlap, per employee.
///
/// Each group is the membership of one merged interval with more than one
/// member. Groups are ordered by employee, then by time.
pub fn overlapping_groups(benefits: &[Benefit]) -> Vec<Vec<BenefitId>> {
    group_by_employee(benefits)
        .into_values()
        .flat_map(|records| {
            merge_intervals(records.into_iter().map(|b| (b.date_start, b.date_stop, b.id)))
        })
        .filter(MergedInterval::has_overlap)
        .map(|interval| interval.members)
        .collect()
}
