//! Copying validated benefits into resource calendars.
//!
//! Attendance benefits become single-date attendance slots and leave
//! benefits become leave periods. Benefits of the global attendance type
//! apply to everyone and are not copied.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Timelike};
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{
    AttendancePattern, Benefit, BenefitType, BenefitTypeId, CalendarAttendance, CalendarLeave,
    DayPeriod, Employee, LeavePeriod,
};
use crate::store::RecordStore;

use super::day_split::split_by_day;
use super::load_employee;

/// The calendar entries created for a batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CalendarSync {
    /// Attendance slots created.
    pub attendances: Vec<CalendarAttendance>,
    /// Leave periods created.
    pub leaves: Vec<CalendarLeave>,
}

/// A local time as fractional hours (`hour + minute / 60`).
///
/// Seconds are ignored.
///
/// # Examples
///
/// ```
/// use benefit_engine::scheduling::fractional_hours;
/// use chrono::TimeZone;
/// use rust_decimal::Decimal;
///
/// let at = chrono_tz::UTC.with_ymd_and_hms(2026, 1, 14, 9, 30, 59).unwrap();
/// assert_eq!(fractional_hours(&at), Decimal::new(95, 1));
/// ```
pub fn fractional_hours(at: &DateTime<Tz>) -> Decimal {
    let minutes = Decimal::from(at.minute()) / Decimal::from(60);
    (Decimal::from(at.hour()) + minutes).normalize()
}

/// Builds the attendance slot for a benefit whose local start and end fall
/// on the same date.
pub fn attendance_pattern(
    benefit: &Benefit,
    employee: &Employee,
    start: &DateTime<Tz>,
    end: &DateTime<Tz>,
) -> AttendancePattern {
    AttendancePattern {
        name: benefit.name.clone(),
        day_of_week: start.weekday(),
        date_from: start.date_naive(),
        date_to: end.date_naive(),
        hour_from: fractional_hours(start),
        hour_to: fractional_hours(end),
        day_period: DayPeriod::from_end_hour(end.hour()),
        calendar_id: employee.calendar_id,
        resource_id: employee.resource_id,
        benefit_type_id: benefit.benefit_type_id,
    }
}

/// Creates one attendance slot per benefit.
///
/// Every benefit must start and end on the same local date; if any does
/// not, nothing is created.
pub fn duplicate_to_calendar_attendance<S>(
    store: &mut S,
    benefits: &[Benefit],
    settings: &EngineSettings,
) -> EngineResult<Vec<CalendarAttendance>>
where
    S: RecordStore + ?Sized,
{
    let mut patterns = Vec::with_capacity(benefits.len());
    for benefit in benefits {
        let employee = load_employee(&*store, benefit.employee_id)?;
        let start = employee.to_local(benefit.date_start, settings.default_timezone);
        let end = employee.to_local(benefit.date_stop, settings.default_timezone);
        if start.date_naive() != end.date_naive() {
            return Err(EngineError::MultiDayAttendance {
                benefit_id: benefit.id,
            });
        }
        patterns.push(attendance_pattern(benefit, &employee, &start, &end));
    }

    patterns
        .into_iter()
        .map(|pattern| store.create_calendar_attendance(pattern))
        .collect()
}

/// Creates a leave period for every benefit not already backed by a leave.
pub fn duplicate_to_calendar_leave<S>(
    store: &mut S,
    benefits: &[Benefit],
) -> EngineResult<Vec<CalendarLeave>>
where
    S: RecordStore + ?Sized,
{
    let mut created = Vec::new();
    for benefit in benefits.iter().filter(|b| b.leave_id.is_none()) {
        let employee = load_employee(&*store, benefit.employee_id)?;
        created.push(store.create_calendar_leave(LeavePeriod {
            name: benefit.name.clone(),
            date_from: benefit.date_start,
            date_to: benefit.date_stop,
            calendar_id: employee.calendar_id,
            resource_id: employee.resource_id,
            benefit_type_id: benefit.benefit_type_id,
        })?);
    }
    Ok(created)
}

/// Copies validated benefits into their employees' calendars.
///
/// Attendance benefits (typed, not leave, not the global attendance type)
/// are split by local day first. Untyped benefits are skipped.
pub fn duplicate_to_calendar<S>(
    store: &mut S,
    benefits: &[Benefit],
    settings: &EngineSettings,
) -> EngineResult<CalendarSync>
where
    S: RecordStore + ?Sized,
{
    let global_type = match &settings.global_attendance_type {
        Some(code) => Some(
            store
                .benefit_type_by_code(code)?
                .ok_or_else(|| EngineError::BenefitTypeNotFound {
                    reference: code.clone(),
                })?
                .id,
        ),
        None => None,
    };

    let mut types: BTreeMap<BenefitTypeId, BenefitType> = BTreeMap::new();
    let mut attendance = Vec::new();
    let mut leave = Vec::new();
    for benefit in benefits {
        let Some(type_id) = benefit.benefit_type_id else {
            continue;
        };
        if !types.contains_key(&type_id) {
            let benefit_type =
                store
                    .benefit_type(type_id)?
                    .ok_or_else(|| EngineError::BenefitTypeNotFound {
                        reference: type_id.to_string(),
                    })?;
            types.insert(type_id, benefit_type);
        }
        if types[&type_id].is_leave {
            leave.push(benefit.clone());
        } else if Some(type_id) != global_type {
            attendance.push(benefit.clone());
        }
    }

    let mut sync = CalendarSync::default();
    for benefit in &attendance {
        let days = split_by_day(store, std::slice::from_ref(benefit), settings)?;
        sync.attendances
            .extend(duplicate_to_calendar_attendance(store, &days, settings)?);
    }
    sync.leaves = duplicate_to_calendar_leave(store, &leave)?;

    debug!(
        attendances = sync.attendances.len(),
        leaves = sync.leaves.len(),
        "Benefits copied to calendars"
    );
    Ok(sync)
}
