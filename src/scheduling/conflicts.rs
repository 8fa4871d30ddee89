//! Conflict detection.
//!
//! A batch of benefits is checked three ways: benefits without a type,
//! benefits overlapping other benefits of the same employee, and benefits
//! touching a leave that still awaits approval. Findings are gathered in a
//! [`WarningReport`] and then written back as warning flags.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::EngineResult;
use crate::models::{Benefit, BenefitChanges, BenefitId, LeaveId};
use crate::store::{Field, Filter, Operator, RecordStore};

use super::intervals::overlapping_groups;

/// The findings of a conflict check.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WarningReport {
    /// Benefits that have no benefit type.
    pub undefined_type: BTreeSet<BenefitId>,
    /// Benefits that overlap another benefit of the same employee.
    pub schedule_conflicts: BTreeSet<BenefitId>,
    /// Benefits touching a pending leave, with the leave to link.
    pub leave_conflicts: BTreeMap<BenefitId, LeaveId>,
}

impl WarningReport {
    /// Returns true if any check found something.
    pub fn has_errors(&self) -> bool {
        !self.undefined_type.is_empty()
            || !self.schedule_conflicts.is_empty()
            || !self.leave_conflicts.is_empty()
    }

    /// Every benefit that should carry the warning flag.
    pub fn flagged(&self) -> BTreeSet<BenefitId> {
        self.undefined_type
            .iter()
            .chain(&self.schedule_conflicts)
            .chain(self.leave_conflicts.keys())
            .copied()
            .collect()
    }
}

/// Records the benefits that have no type. Returns true if any were found.
pub fn detect_undefined_types(records: &[Benefit], report: &mut WarningReport) -> bool {
    let before = report.undefined_type.len();
    report.undefined_type.extend(
        records
            .iter()
            .filter(|b| b.benefit_type_id.is_none())
            .map(|b| b.id),
    );
    report.undefined_type.len() > before
}

/// Records every stored benefit that overlaps another one of its employee
/// within the span covered by `records`.
///
/// The search covers all active benefits sharing time with the span, so
/// records outside the input can be reported too.
pub fn detect_schedule_conflicts<S>(
    store: &S,
    records: &[Benefit],
    report: &mut WarningReport,
) -> EngineResult<bool>
where
    S: RecordStore + ?Sized,
{
    let (Some(span_start), Some(span_stop)) = (
        records.iter().map(|b| b.date_start).min(),
        records.iter().map(|b| b.date_stop).max(),
    ) else {
        return Ok(false);
    };

    let filter = Filter::new()
        .and(Field::DateStart, Operator::Lt, span_stop)
        .and(Field::DateStop, Operator::Gt, span_start);
    let candidates = store.search_benefits(&filter)?;

    let mut conflict = false;
    for group in overlapping_groups(&candidates) {
        debug!(benefits = ?group, "Overlapping benefits");
        report.schedule_conflicts.extend(group);
        conflict = true;
    }
    Ok(conflict)
}

/// Records every benefit in `records` that touches a pending leave of its
/// employee. The first matching leave is kept for linking.
pub fn detect_leave_conflicts<S>(
    store: &S,
    records: &[Benefit],
    report: &mut WarningReport,
) -> EngineResult<bool>
where
    S: RecordStore + ?Sized,
{
    if records.is_empty() {
        return Ok(false);
    }
    let ids: Vec<BenefitId> = records.iter().map(|b| b.id).collect();
    let pairs = store.pending_leave_overlaps(&ids)?;
    for (benefit_id, leave_id) in &pairs {
        report.leave_conflicts.entry(*benefit_id).or_insert(*leave_id);
    }
    Ok(!pairs.is_empty())
}

/// Runs all three checks without touching the store.
pub fn detect_conflicts<S>(store: &S, records: &[Benefit]) -> EngineResult<WarningReport>
where
    S: RecordStore + ?Sized,
{
    let mut report = WarningReport::default();
    if records.is_empty() {
        return Ok(report);
    }
    detect_undefined_types(records, &mut report);
    detect_schedule_conflicts(store, records, &mut report)?;
    detect_leave_conflicts(store, records, &mut report)?;
    Ok(report)
}

/// Writes the warning flags and leave links of a report.
pub fn apply_warnings<S>(store: &mut S, report: &WarningReport) -> EngineResult<()>
where
    S: RecordStore + ?Sized,
{
    let flag_only: Vec<BenefitId> = report
        .undefined_type
        .iter()
        .chain(&report.schedule_conflicts)
        .filter(|id| !report.leave_conflicts.contains_key(*id))
        .copied()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    if !flag_only.is_empty() {
        store.write_benefits(&flag_only, &BenefitChanges::warning(true))?;
    }
    for (benefit_id, leave_id) in &report.leave_conflicts {
        store.write_benefits(
            &[*benefit_id],
            &BenefitChanges::warning(true).with_leave(*leave_id),
        )?;
    }
    Ok(())
}

/// Checks `records` for conflicts and flags the offenders.
///
/// An empty batch is a no-op with an empty report.
pub fn check_for_errors<S>(store: &mut S, records: &[Benefit]) -> EngineResult<WarningReport>
where
    S: RecordStore + ?Sized,
{
    let report = detect_conflicts(&*store, records)?;
    apply_warnings(store, &report)?;
    if report.has_errors() {
        info!(
            checked = records.len(),
            undefined_type = report.undefined_type.len(),
            schedule_conflicts = report.schedule_conflicts.len(),
            leave_conflicts = report.leave_conflicts.len(),
            "Benefit conflicts found"
        );
    }
    Ok(report)
}

/// Checks `records` for conflicts, flags the offenders and returns whether
/// anything was found.
pub fn check_if_error<S>(store: &mut S, records: &[Benefit]) -> EngineResult<bool>
where
    S: RecordStore + ?Sized,
{
    Ok(check_for_errors(store, records)?.has_errors())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BenefitTypeId, EmployeeId, Leave, LeaveState, NewBenefit};
    use crate::store::InMemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    fn create(
        store: &mut InMemoryStore,
        employee: u64,
        start: DateTime<Utc>,
        stop: DateTime<Utc>,
        benefit_type: Option<u64>,
    ) -> Benefit {
        store
            .create_benefit(NewBenefit::new(
                "Attendance",
                EmployeeId(employee),
                start,
                stop,
                benefit_type.map(BenefitTypeId),
            ))
            .unwrap()
    }

    fn flag(store: &InMemoryStore, benefit: &Benefit) -> bool {
        store.benefit(benefit.id).unwrap().display_warning
    }

    #[test]
    fn test_empty_batch_is_noop() {
        let mut store = InMemoryStore::new();
        assert!(!check_if_error(&mut store, &[]).unwrap());
    }

    #[test]
    fn test_overlapping_pair_is_flagged() {
        let mut store = InMemoryStore::new();
        let a = create(&mut store, 1, at(14, 9), at(14, 13), Some(1));
        let b = create(&mut store, 1, at(14, 12), at(14, 17), Some(2));

        assert!(check_if_error(&mut store, &[a.clone(), b.clone()]).unwrap());
        assert!(flag(&store, &a));
        assert!(flag(&store, &b));
    }

    #[test]
    fn test_touching_pair_is_not_flagged() {
        let mut store = InMemoryStore::new();
        let a = create(&mut store, 1, at(14, 9), at(14, 12), Some(1));
        let b = create(&mut store, 1, at(14, 12), at(14, 17), Some(1));

        assert!(!check_if_error(&mut store, &[a.clone(), b.clone()]).unwrap());
        assert!(!flag(&store, &a));
        assert!(!flag(&store, &b));
    }

    #[test]
    fn test_different_employees_do_not_conflict() {
        let mut store = InMemoryStore::new();
        let a = create(&mut store, 1, at(14, 9), at(14, 17), Some(1));
        let b = create(&mut store, 2, at(14, 9), at(14, 17), Some(1));

        assert!(!check_if_error(&mut store, &[a, b]).unwrap());
    }

    #[test]
    fn test_conflict_with_stored_benefit_outside_batch() {
        let mut store = InMemoryStore::new();
        let stored = create(&mut store, 1, at(14, 8), at(14, 10), Some(1));
        let checked = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));

        let report = check_for_errors(&mut store, &[checked.clone()]).unwrap();
        assert_eq!(
            report.schedule_conflicts,
            BTreeSet::from([stored.id, checked.id])
        );
        assert!(flag(&store, &stored));
    }

    #[test]
    fn test_cancelled_benefits_are_ignored() {
        let mut store = InMemoryStore::new();
        let cancelled = create(&mut store, 1, at(14, 8), at(14, 10), Some(1));
        store
            .write_benefits(
                &[cancelled.id],
                &BenefitChanges::state(crate::models::BenefitState::Cancelled),
            )
            .unwrap();
        let checked = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));

        assert!(!check_if_error(&mut store, &[checked]).unwrap());
    }

    #[test]
    fn test_undefined_type_is_flagged_alone() {
        let mut store = InMemoryStore::new();
        let untyped = create(&mut store, 1, at(14, 9), at(14, 12), None);
        let clean = create(&mut store, 1, at(15, 9), at(15, 12), Some(1));

        let report = check_for_errors(&mut store, &[untyped.clone(), clean.clone()]).unwrap();
        assert!(report.has_errors());
        assert_eq!(report.undefined_type, BTreeSet::from([untyped.id]));
        assert!(report.schedule_conflicts.is_empty());
        assert!(flag(&store, &untyped));
        assert!(!flag(&store, &clean));
    }

    #[test]
    fn test_pending_leave_is_linked() {
        let mut store = InMemoryStore::new();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 17), Some(1));
        for (id, state) in [(7, LeaveState::Validate1), (3, LeaveState::Confirm)] {
            store.insert_leave(Leave {
                id: LeaveId(id),
                employee_id: EmployeeId(1),
                date_from: at(14, 0),
                date_to: at(14, 23),
                state,
            });
        }

        let report = check_for_errors(&mut store, &[benefit.clone()]).unwrap();
        assert_eq!(report.leave_conflicts[&benefit.id], LeaveId(3));

        let stored = store.benefit(benefit.id).unwrap();
        assert!(stored.display_warning);
        assert_eq!(stored.leave_id, Some(LeaveId(3)));
    }

    #[test]
    fn test_approved_leave_is_not_a_conflict() {
        let mut store = InMemoryStore::new();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 17), Some(1));
        store.insert_leave(Leave {
            id: LeaveId(1),
            employee_id: EmployeeId(1),
            date_from: at(14, 0),
            date_to: at(14, 23),
            state: LeaveState::Validate,
        });

        assert!(!check_if_error(&mut store, &[benefit]).unwrap());
    }

    #[test]
    fn test_flags_from_all_checks_accumulate() {
        let mut store = InMemoryStore::new();
        let untyped = create(&mut store, 1, at(14, 9), at(14, 12), None);
        let overlapping = create(&mut store, 1, at(14, 11), at(14, 13), Some(1));
        store.insert_leave(Leave {
            id: LeaveId(1),
            employee_id: EmployeeId(1),
            date_from: at(14, 13),
            date_to: at(14, 20),
            state: LeaveState::Confirm,
        });

        let report = check_for_errors(&mut store, &[untyped.clone(), overlapping.clone()]).unwrap();
        assert_eq!(report.flagged(), BTreeSet::from([untyped.id, overlapping.id]));
        assert_eq!(
            report.leave_conflicts,
            BTreeMap::from([(overlapping.id, LeaveId(1))])
        );
        assert_eq!(store.benefit(untyped.id).unwrap().leave_id, None);
        assert_eq!(
            store.benefit(overlapping.id).unwrap().leave_id,
            Some(LeaveId(1))
        );
    }
}
