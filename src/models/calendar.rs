//! Calendar entries produced from validated benefits.
//!
//! Attendance benefits become [`CalendarAttendance`] rows (a weekly pattern
//! bounded to a single date); leave benefits become [`CalendarLeave`] periods.

use chrono::{DateTime, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{BenefitTypeId, CalendarAttendanceId, CalendarId, CalendarLeaveId, ResourceId};

/// Coarse half-day tag of an attendance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayPeriod {
    /// Ends at or before noon.
    Morning,
    /// Ends after noon.
    Afternoon,
}

impl DayPeriod {
    /// Classifies an attendance by the local hour it ends at.
    ///
    /// # Examples
    ///
    /// ```
    /// use benefit_engine::models::DayPeriod;
    ///
    /// assert_eq!(DayPeriod::from_end_hour(12), DayPeriod::Morning);
    /// assert_eq!(DayPeriod::from_end_hour(13), DayPeriod::Afternoon);
    /// ```
    pub fn from_end_hour(hour: u32) -> Self {
        if hour <= 12 {
            DayPeriod::Morning
        } else {
            DayPeriod::Afternoon
        }
    }
}

/// The values of a recurring attendance slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendancePattern {
    /// Name copied from the benefit.
    pub name: String,
    /// Weekday of the slot.
    pub day_of_week: Weekday,
    /// First date the slot applies to.
    pub date_from: NaiveDate,
    /// Last date the slot applies to.
    pub date_to: NaiveDate,
    /// Local start as fractional hours.
    pub hour_from: Decimal,
    /// Local end as fractional hours.
    pub hour_to: Decimal,
    /// Morning or afternoon.
    pub day_period: DayPeriod,
    /// Calendar the slot belongs to.
    pub calendar_id: CalendarId,
    /// Resource the slot applies to.
    pub resource_id: ResourceId,
    /// Type of the originating benefit.
    pub benefit_type_id: Option<BenefitTypeId>,
}

impl AttendancePattern {
    /// Day of week as an index with Monday = 0.
    pub fn day_index(&self) -> u32 {
        self.day_of_week.num_days_from_monday()
    }
}

/// A persisted attendance slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarAttendance {
    /// Identifier assigned by the store.
    pub id: CalendarAttendanceId,
    /// The slot values.
    #[serde(flatten)]
    pub pattern: AttendancePattern,
}

/// The values of a leave period on a resource's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeavePeriod {
    /// Name copied from the benefit.
    pub name: String,
    /// Start of the period (UTC).
    pub date_from: DateTime<Utc>,
    /// End of the period (UTC).
    pub date_to: DateTime<Utc>,
    /// Calendar the period belongs to.
    pub calendar_id: CalendarId,
    /// Resource on leave.
    pub resource_id: ResourceId,
    /// Type of the originating benefit.
    pub benefit_type_id: Option<BenefitTypeId>,
}

/// A persisted leave period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarLeave {
    /// Identifier assigned by the store.
    pub id: CalendarLeaveId,
    /// The period values.
    #[serde(flatten)]
    pub period: LeavePeriod,
}
