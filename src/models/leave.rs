//! Leave model.
//!
//! Leaves are owned by the time-off workflow; the engine only reads their
//! range, employee and approval state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{EmployeeId, LeaveId};

/// Approval state of a leave request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeaveState {
    /// Being drafted by the employee.
    Draft,
    /// Submitted, waiting for the first approval.
    Confirm,
    /// Refused by a manager.
    Refuse,
    /// First approval given, waiting for the second.
    Validate1,
    /// Fully approved.
    Validate,
    /// Withdrawn.
    Cancel,
}

impl LeaveState {
    /// Returns true if the leave still waits for an approval.
    pub fn is_pending(self) -> bool {
        matches!(self, LeaveState::Confirm | LeaveState::Validate1)
    }
}

/// A time-off request for an employee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leave {
    /// Unique identifier.
    pub id: LeaveId,
    /// The employee requesting the leave.
    pub employee_id: EmployeeId,
    /// First instant of the leave.
    pub date_from: DateTime<Utc>,
    /// Last instant of the leave.
    pub date_to: DateTime<Utc>,
    /// Approval state.
    pub state: LeaveState,
}

impl Leave {
    /// Returns true if the leave touches `[start, stop]`, endpoints included.
    pub fn touches(&self, start: DateTime<Utc>, stop: DateTime<Utc>) -> bool {
        self.date_from <= stop && self.date_to >= start
    }
}
