//! Benefit state machine.
//!
//! Validation promotes a batch of benefits to `validated` only if none of
//! them has a conflict, then copies them into the calendars. The whole run
//! happens in one store transaction: any error undoes every write, warning
//! flags included.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{BenefitChanges, BenefitId, BenefitState, LeaveId};
use crate::store::{Field, Filter, Operator, RecordStore, in_transaction};

use super::calendar_sync::{CalendarSync, duplicate_to_calendar};
use super::conflicts::{WarningReport, check_for_errors};

/// Result of a validation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationOutcome {
    /// True if the batch was validated.
    pub validated: bool,
    /// The conflicts found. Empty when `validated` is true.
    pub report: WarningReport,
    /// Calendar entries created for the batch.
    pub calendar: CalendarSync,
}

/// A client action opening the leave linked to a benefit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaveAction {
    /// Action kind, always `act_window`.
    #[serde(rename = "type")]
    pub action_type: String,
    /// Model of the record to open.
    pub res_model: String,
    /// The leave to open.
    pub res_id: LeaveId,
    /// View to open it in.
    pub view_mode: String,
}

impl LeaveAction {
    fn open(leave_id: LeaveId) -> Self {
        Self {
            action_type: "act_window".to_string(),
            res_model: "leave".to_string(),
            res_id: leave_id,
            view_mode: "form".to_string(),
        }
    }
}

/// Validates the active, not yet validated benefits among `ids`.
///
/// Their warning flags are cleared and the conflict check runs again. With
/// no conflicts the benefits move to `validated` and are copied into the
/// calendars; otherwise they keep their state and the new flags.
pub fn validate<S>(
    store: &mut S,
    settings: &EngineSettings,
    ids: &[BenefitId],
) -> EngineResult<ValidationOutcome>
where
    S: RecordStore + ?Sized,
{
    in_transaction(store, |store| {
        let filter = Filter::new()
            .and(Field::Id, Operator::In, ids)
            .and(Field::State, Operator::Ne, BenefitState::Validated);
        let records = store.search_benefits(&filter)?;
        let record_ids: Vec<BenefitId> = records.iter().map(|b| b.id).collect();

        if !record_ids.is_empty() {
            store.write_benefits(&record_ids, &BenefitChanges::warning(false))?;
        }

        let report = check_for_errors(store, &records)?;
        if report.has_errors() {
            info!(
                requested = ids.len(),
                flagged = report.flagged().len(),
                "Validation refused"
            );
            return Ok(ValidationOutcome {
                validated: false,
                report,
                calendar: CalendarSync::default(),
            });
        }

        if record_ids.is_empty() {
            return Ok(ValidationOutcome {
                validated: true,
                ..ValidationOutcome::default()
            });
        }

        store.write_benefits(&record_ids, &BenefitChanges::state(BenefitState::Validated))?;
        let validated = store.browse_benefits(&record_ids)?;
        let calendar = duplicate_to_calendar(store, &validated, settings)?;

        info!(
            validated = record_ids.len(),
            attendances = calendar.attendances.len(),
            leaves = calendar.leaves.len(),
            "Benefits validated"
        );
        Ok(ValidationOutcome {
            validated: true,
            report,
            calendar,
        })
    })
}

/// Validates the benefits among `ids` and returns whether the batch passed.
pub fn action_validate<S>(
    store: &mut S,
    settings: &EngineSettings,
    ids: &[BenefitId],
) -> EngineResult<bool>
where
    S: RecordStore + ?Sized,
{
    Ok(validate(store, settings, ids)?.validated)
}

fn move_to<S>(store: &mut S, ids: &[BenefitId], state: BenefitState) -> EngineResult<()>
where
    S: RecordStore + ?Sized,
{
    store.write_benefits(ids, &BenefitChanges::state(state))?;
    info!(count = ids.len(), state = %state, "Benefit state changed");
    Ok(())
}

/// Moves benefits to `confirmed`.
pub fn action_confirm<S>(store: &mut S, ids: &[BenefitId]) -> EngineResult<()>
where
    S: RecordStore + ?Sized,
{
    move_to(store, ids, BenefitState::Confirmed)
}

/// Moves benefits to `cancelled`, which also deactivates them.
pub fn action_cancel<S>(store: &mut S, ids: &[BenefitId]) -> EngineResult<()>
where
    S: RecordStore + ?Sized,
{
    move_to(store, ids, BenefitState::Cancelled)
}

/// Moves benefits back to `draft`, reactivating cancelled ones.
pub fn action_reset_to_draft<S>(store: &mut S, ids: &[BenefitId]) -> EngineResult<()>
where
    S: RecordStore + ?Sized,
{
    move_to(store, ids, BenefitState::Draft)
}

/// Returns the action opening the leave linked to a benefit.
pub fn action_leave<S>(store: &S, benefit_id: BenefitId) -> EngineResult<LeaveAction>
where
    S: RecordStore + ?Sized,
{
    let benefit = store
        .browse_benefits(&[benefit_id])?
        .into_iter()
        .next()
        .ok_or(EngineError::BenefitNotFound { id: benefit_id })?;
    benefit
        .leave_id
        .map(LeaveAction::open)
        .ok_or(EngineError::NoLinkedLeave { benefit_id })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        Benefit, BenefitType, BenefitTypeId, CalendarId, Employee, EmployeeId, Leave, LeaveState,
        NewBenefit, ResourceId,
    };
    use crate::store::InMemoryStore;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, day, hour, 0, 0).unwrap()
    }

    fn store() -> InMemoryStore {
        let mut store = InMemoryStore::with_benefit_types([
            BenefitType {
                id: BenefitTypeId(1),
                name: "Attendance".to_string(),
                code: Some("WORK100".to_string()),
                color: 1,
                sequence: 10,
                active: true,
                is_leave: false,
            },
            BenefitType {
                id: BenefitTypeId(2),
                name: "Training".to_string(),
                code: Some("TRAINING".to_string()),
                color: 2,
                sequence: 20,
                active: true,
                is_leave: false,
            },
        ]);
        store.insert_employee(Employee {
            id: EmployeeId(1),
            name: "Alice".to_string(),
            tz: None,
            resource_id: ResourceId(1),
            calendar_id: CalendarId(1),
        });
        store
    }

    fn settings() -> EngineSettings {
        EngineSettings {
            global_attendance_type: Some("WORK100".to_string()),
            default_timezone: chrono_tz::UTC,
        }
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
                "Shift",
                EmployeeId(employee),
                start,
                stop,
                benefit_type.map(BenefitTypeId),
            ))
            .unwrap()
    }

    fn stored(store: &InMemoryStore, benefit: &Benefit) -> Benefit {
        store.benefit(benefit.id).unwrap().clone()
    }

    #[test]
    fn test_clean_batch_is_validated() {
        let mut store = store();
        let attendance = create(&mut store, 1, at(14, 9), at(14, 12), Some(1));
        let training = create(&mut store, 1, at(14, 13), at(14, 17), Some(2));

        let outcome = validate(&mut store, &settings(), &[attendance.id, training.id]).unwrap();

        assert!(outcome.validated);
        assert!(!outcome.report.has_errors());
        assert_eq!(stored(&store, &attendance).state, BenefitState::Validated);
        assert_eq!(stored(&store, &training).state, BenefitState::Validated);
        // Only the training is copied; attendance of the global type is not.
        assert_eq!(outcome.calendar.attendances.len(), 1);
        assert_eq!(store.calendar_attendances().count(), 1);
    }

    #[test]
    fn test_undefined_type_blocks_whole_batch() {
        let mut store = store();
        let untyped = create(&mut store, 1, at(14, 9), at(14, 12), None);
        let clean = create(&mut store, 1, at(15, 9), at(15, 12), Some(2));

        let validated = action_validate(&mut store, &settings(), &[untyped.id, clean.id]).unwrap();

        assert!(!validated);
        let untyped = stored(&store, &untyped);
        let clean = stored(&store, &clean);
        assert_eq!(untyped.state, BenefitState::Draft);
        assert_eq!(clean.state, BenefitState::Draft);
        assert!(untyped.display_warning);
        assert!(!clean.display_warning);
        assert_eq!(store.calendar_attendances().count(), 0);
    }

    #[test]
    fn test_previous_warning_is_cleared() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));
        store
            .write_benefits(&[benefit.id], &BenefitChanges::warning(true))
            .unwrap();

        assert!(action_validate(&mut store, &settings(), &[benefit.id]).unwrap());
        assert!(!stored(&store, &benefit).display_warning);
    }

    #[test]
    fn test_pending_leave_blocks_validation() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));
        store.insert_leave(Leave {
            id: LeaveId(9),
            employee_id: EmployeeId(1),
            date_from: at(14, 0),
            date_to: at(14, 23),
            state: LeaveState::Confirm,
        });

        let outcome = validate(&mut store, &settings(), &[benefit.id]).unwrap();

        assert!(!outcome.validated);
        assert_eq!(stored(&store, &benefit).leave_id, Some(LeaveId(9)));
        assert_eq!(
            action_leave(&store, benefit.id).unwrap(),
            LeaveAction::open(LeaveId(9))
        );
    }

    #[test]
    fn test_overnight_across_midnight_fall_back_is_copied_per_day() {
        let mut store = store();
        store.insert_employee(Employee {
            id: EmployeeId(2),
            name: "Bruno".to_string(),
            tz: Some(chrono_tz::America::Santiago),
            resource_id: ResourceId(2),
            calendar_id: CalendarId(1),
        });
        // 2026-04-04 20:00 -03 to 2026-04-05 10:00 -04 in Santiago.
        let benefit = create(
            &mut store,
            2,
            Utc.with_ymd_and_hms(2026, 4, 4, 23, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 4, 5, 14, 0, 0).unwrap(),
            Some(2),
        );

        let outcome = validate(&mut store, &settings(), &[benefit.id]).unwrap();

        assert!(outcome.validated);
        assert_eq!(outcome.calendar.attendances.len(), 2);
        assert_eq!(store.calendar_attendances().count(), 2);
    }

    #[test]
    fn test_validated_benefits_are_skipped() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));
        assert!(action_validate(&mut store, &settings(), &[benefit.id]).unwrap());

        let outcome = validate(&mut store, &settings(), &[benefit.id]).unwrap();
        assert!(outcome.validated);
        assert!(outcome.calendar.attendances.is_empty());
        assert_eq!(store.calendar_attendances().count(), 1);
    }

    #[test]
    fn test_failure_rolls_back_every_write() {
        let mut store = store();
        // Employee 2 does not exist, so copying to the calendar fails.
        let benefit = create(&mut store, 2, at(14, 9), at(14, 12), Some(2));
        store
            .write_benefits(&[benefit.id], &BenefitChanges::warning(true))
            .unwrap();

        let err = action_validate(&mut store, &settings(), &[benefit.id]).unwrap_err();

        assert!(matches!(err, EngineError::EmployeeNotFound { .. }));
        let benefit = stored(&store, &benefit);
        assert_eq!(benefit.state, BenefitState::Draft);
        assert!(benefit.display_warning);
    }

    #[test]
    fn test_state_helpers() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));

        action_confirm(&mut store, &[benefit.id]).unwrap();
        assert_eq!(stored(&store, &benefit).state, BenefitState::Confirmed);

        action_cancel(&mut store, &[benefit.id]).unwrap();
        let cancelled = stored(&store, &benefit);
        assert_eq!(cancelled.state, BenefitState::Cancelled);
        assert!(!cancelled.active);

        let err = action_confirm(&mut store, &[benefit.id]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));

        action_reset_to_draft(&mut store, &[benefit.id]).unwrap();
        let draft = stored(&store, &benefit);
        assert_eq!(draft.state, BenefitState::Draft);
        assert!(draft.active);
    }

    #[test]
    fn test_validated_is_terminal() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));
        assert!(action_validate(&mut store, &settings(), &[benefit.id]).unwrap());

        let err = action_cancel(&mut store, &[benefit.id]).unwrap_err();
        assert!(matches!(err, EngineError::InvalidStateTransition { .. }));
    }

    #[test]
    fn test_action_leave_without_link() {
        let mut store = store();
        let benefit = create(&mut store, 1, at(14, 9), at(14, 12), Some(2));

        assert!(matches!(
            action_leave(&store, benefit.id),
            Err(EngineError::NoLinkedLeave { .. })
        ));
        assert!(matches!(
            action_leave(&store, BenefitId(99)),
            Err(EngineError::BenefitNotFound { .. })
        ));
    }
}
