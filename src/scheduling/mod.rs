//! Scheduling logic for benefits.
//!
//! This module contains the business rules that run over batches of
//! benefits:
//!
//! - [`intervals`]: merging time ranges to find overlaps
//! - [`conflicts`]: flagging untyped, overlapping and leave-blocked benefits
//! - [`day_split`]: cutting multi-day benefits at local midnight
//! - [`calendar_sync`]: copying validated benefits into resource calendars
//! - [`validation`]: the benefit state machine
//! - [`safe_create`]: bulk creation that skips existing benefits

pub mod calendar_sync;
pub mod conflicts;
pub mod day_split;
pub mod intervals;
pub mod safe_create;
pub mod validation;

pub use calendar_sync::{
    CalendarSync, attendance_pattern, duplicate_to_calendar, duplicate_to_calendar_attendance,
    duplicate_to_calendar_leave, fractional_hours,
};
pub use conflicts::{
    WarningReport, apply_warnings, check_for_errors, check_if_error, detect_conflicts,
    detect_leave_conflicts, detect_schedule_conflicts, detect_undefined_types,
};
pub use day_split::{DaySegment, split_by_day, split_range_by_day};
pub use intervals::{MergedInterval, group_by_employee, merge_intervals, overlapping_groups};
pub use safe_create::safe_duplicate_create;
pub use validation::{
    LeaveAction, ValidationOutcome, action_cancel, action_confirm, action_leave,
    action_reset_to_draft, action_validate, validate,
};

use crate::error::{EngineError, EngineResult};
use crate::models::{Employee, EmployeeId};
use crate::store::RecordStore;

/// Fetches an employee, failing if it does not exist.
pub(crate) fn load_employee<S>(store: &S, id: EmployeeId) -> EngineResult<Employee>
where
    S: RecordStore + ?Sized,
{
    store
        .employee(id)?
        .ok_or(EngineError::EmployeeNotFound { id })
}
