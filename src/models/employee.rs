//! Employee model.
//!
//! Only the parts of an employee the engine needs: the timezone used to find
//! local day boundaries, and the resource and calendar that materialized
//! entries are attached to.

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use super::{CalendarId, EmployeeId, ResourceId};

/// Represents an employee that benefits are assigned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee.
    pub id: EmployeeId,
    /// The employee's display name.
    pub name: String,
    /// The employee's IANA timezone (e.g., "Europe/Brussels").
    #[serde(default)]
    pub tz: Option<Tz>,
    /// The scheduling resource backing the employee.
    pub resource_id: ResourceId,
    /// The employee's working-time calendar.
    pub calendar_id: CalendarId,
}

impl Employee {
    /// Returns the employee's timezone, or `fallback` if none is set.
    pub fn timezone_or(&self, fallback: Tz) -> Tz {
        self.tz.unwrap_or(fallback)
    }

    /// Converts a UTC timestamp into the employee's local time.
    ///
    /// # Examples
    ///
    /// ```
    /// use benefit_engine::models::{CalendarId, Employee, EmployeeId, ResourceId};
    /// use chrono::{TimeZone, Timelike, Utc};
    ///
    /// let employee = Employee {
    ///     id: EmployeeId(1),
    ///     name: "Alice".to_string(),
    ///     tz: Some(chrono_tz::Europe::Brussels),
    ///     resource_id: ResourceId(1),
    ///     calendar_id: CalendarId(1),
    /// };
    /// let local = employee.to_local(Utc.with_ymd_and_hms(2026, 1, 14, 8, 0, 0).unwrap(), chrono_tz::UTC);
    /// assert_eq!(local.hour(), 9);
    /// ```
    pub fn to_local(&self, at: DateTime<Utc>, fallback: Tz) -> DateTime<Tz> {
        at.with_timezone(&self.timezone_or(fallback))
    }
}
