//! Core data models for the Benefit Engine.
//!
//! This module contains the records the engine reads and writes: benefits and
//! their types, the employees they belong to, the leaves they are checked
//! against, and the calendar entries produced once a benefit is validated.

mod benefit;
mod benefit_type;
mod calendar;
mod employee;
mod leave;

pub use benefit::{
    Benefit, BenefitChanges, BenefitKey, BenefitState, NewBenefit, add_hours, hours_between,
};
pub use benefit_type::BenefitType;
pub use calendar::{AttendancePattern, CalendarAttendance, CalendarLeave, DayPeriod, LeavePeriod};
pub use employee::Employee;
pub use leave::{Leave, LeaveState};

use serde::{Deserialize, Serialize};

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

record_id!(
    /// Identifier of a benefit record.
    BenefitId
);
record_id!(
    /// Identifier of a benefit type.
    BenefitTypeId
);
record_id!(
    /// Identifier of an employee.
    EmployeeId
);
record_id!(
    /// Identifier of a leave request.
    LeaveId
);
record_id!(
    /// Identifier of an employee's scheduling resource.
    ResourceId
);
record_id!(
    /// Identifier of a working-time calendar.
    CalendarId
);
record_id!(
    /// Identifier of a materialized calendar attendance.
    CalendarAttendanceId
);
record_id!(
    /// Identifier of a materialized calendar leave period.
    CalendarLeaveId
);
