//! Splitting benefits at local day boundaries.
//!
//! A benefit that starts and ends on different local dates (in the
//! employee's timezone) is replaced by one benefit per day. Each day but the
//! last ends at 23:59:59 local, and the next one starts a second later, so
//! every piece stays on a single calendar date.

use chrono::{DateTime, NaiveDate, TimeDelta, TimeZone, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::config::EngineSettings;
use crate::error::{EngineError, EngineResult};
use crate::models::{Benefit, BenefitChanges, EmployeeId, NewBenefit};
use crate::store::RecordStore;

use super::load_employee;

/// One piece of a split range, in local time.
pub type DaySegment = (DateTime<Tz>, DateTime<Tz>);

/// Splits a local range into one segment per calendar day.
///
/// Zero-length segments are dropped, so a range ending at midnight does not
/// produce an empty trailing day.
///
/// # Examples
///
/// ```
/// use benefit_engine::models::EmployeeId;
/// use benefit_engine::scheduling::split_range_by_day;
/// use chrono::TimeZone;
/// use chrono_tz::Europe::Brussels;
///
/// let start = Brussels.with_ymd_and_hms(2026, 1, 14, 22, 0, 0).unwrap();
/// let end = Brussels.with_ymd_and_hms(2026, 1, 15, 6, 0, 0).unwrap();
/// let days = split_range_by_day(EmployeeId(1), start, end).unwrap();
///
/// assert_eq!(days.len(), 2);
/// assert_eq!(days[0].1, Brussels.with_ymd_and_hms(2026, 1, 14, 23, 59, 59).unwrap());
/// assert_eq!(days[1].0, Brussels.with_ymd_and_hms(2026, 1, 15, 0, 0, 0).unwrap());
/// assert_eq!(days[1].1, end);
/// ```
pub fn split_range_by_day(
    employee_id: EmployeeId,
    start: DateTime<Tz>,
    end: DateTime<Tz>,
) -> EngineResult<Vec<DaySegment>> {
    let tz = start.timezone();
    let mut days = Vec::new();
    let mut day = start.date_naive();
    let mut current_start = start;
    let mut current_end = local_day_end(employee_id, &tz, day)?;

    while current_end < end {
        days.push((current_start, current_end));
        current_start = current_end + TimeDelta::seconds(1);
        day = day.succ_opt().ok_or(EngineError::NonexistentLocalTime {
            employee_id,
            local: current_end.naive_local(),
        })?;
        current_end = local_day_end(employee_id, &tz, day)?;
    }
    days.push((current_start, end));

    days.retain(|(segment_start, segment_end)| segment_start < segment_end);
    Ok(days)
}

/// The last 23:59:59 local time on `day`.
///
/// Where clocks fall back at midnight that second occurs twice; the later
/// one is taken so the next second is already on the following date.
fn local_day_end(employee_id: EmployeeId, tz: &Tz, day: NaiveDate) -> EngineResult<DateTime<Tz>> {
    let nonexistent = || EngineError::NonexistentLocalTime {
        employee_id,
        local: day.and_hms_opt(23, 59, 59).unwrap_or_default(),
    };
    let local = day.and_hms_opt(23, 59, 59).ok_or_else(nonexistent)?;
    tz.from_local_datetime(&local)
        .latest()
        .ok_or_else(nonexistent)
}

/// Replaces every multi-day benefit by one benefit per local day.
///
/// Single-day benefits are returned as they are. The replacements copy the
/// name, employee and type of the original and are then moved to its state;
/// the state is written separately because creation always yields a draft.
pub fn split_by_day<S>(
    store: &mut S,
    benefits: &[Benefit],
    settings: &EngineSettings,
) -> EngineResult<Vec<Benefit>>
where
    S: RecordStore + ?Sized,
{
    let mut result = Vec::with_capacity(benefits.len());

    for benefit in benefits {
        let employee = load_employee(&*store, benefit.employee_id)?;
        let start = employee.to_local(benefit.date_start, settings.default_timezone);
        let stop = employee.to_local(benefit.date_stop, settings.default_timezone);

        if start.date_naive() == stop.date_naive() {
            result.push(benefit.clone());
            continue;
        }

        let days = split_range_by_day(employee.id, start, stop)?;
        debug!(
            benefit_id = %benefit.id,
            employee_id = %employee.id,
            days = days.len(),
            "Splitting benefit by day"
        );

        store.unlink_benefits(&[benefit.id])?;
        for (day_start, day_stop) in days {
            let created = store.create_benefit(NewBenefit::new(
                benefit.name.clone(),
                benefit.employee_id,
                day_start.with_timezone(&Utc),
                day_stop.with_timezone(&Utc),
                benefit.benefit_type_id,
            ))?;
            store.write_benefits(&[created.id], &BenefitChanges::state(benefit.state))?;
            result.extend(store.browse_benefits(&[created.id])?);
        }
    }

    Ok(result)
}
