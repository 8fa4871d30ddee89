//! Benefit model and related types.
//!
//! A benefit is one scheduled time span assigned to a single employee. This
//! module defines the persisted [`Benefit`] record, the [`NewBenefit`] values
//! used to create one, and the [`BenefitChanges`] applied by a write.

use chrono::{DateTime, TimeDelta, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

use crate::error::{Constraint, EngineError, EngineResult};

use super::{BenefitId, BenefitTypeId, EmployeeId, LeaveId};

const SECONDS_PER_HOUR: i64 = 3600;

/// Lifecycle state of a benefit.
///
/// Benefits start as drafts and are promoted to `Validated` once the
/// conflict check passes. `Cancelled` acts as a soft delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BenefitState {
    /// Freshly created, not yet reviewed.
    Draft,
    /// Confirmed by an operator and awaiting validation.
    Confirmed,
    /// Validated and projected into the calendar. Terminal.
    Validated,
    /// Soft-deleted; the record is inactive.
    Cancelled,
}

impl BenefitState {
    /// Returns true if a benefit in this state may be written to `next`.
    ///
    /// Writing the current state again is always allowed.
    ///
    /// # Examples
    ///
    /// ```
    /// use benefit_engine::models::BenefitState;
    ///
    /// assert!(BenefitState::Draft.can_transition_to(BenefitState::Confirmed));
    /// assert!(BenefitState::Cancelled.can_transition_to(BenefitState::Draft));
    /// assert!(!BenefitState::Cancelled.can_transition_to(BenefitState::Validated));
    /// assert!(!BenefitState::Validated.can_transition_to(BenefitState::Cancelled));
    /// ```
    pub fn can_transition_to(self, next: BenefitState) -> bool {
        if self == next {
            return true;
        }
        match self {
            BenefitState::Draft | BenefitState::Confirmed => true,
            BenefitState::Cancelled => next == BenefitState::Draft,
            BenefitState::Validated => false,
        }
    }

    /// The active flag this state forces on the record, if any.
    pub fn forced_active(self) -> Option<bool> {
        match self {
            BenefitState::Draft => Some(true),
            BenefitState::Cancelled => Some(false),
            BenefitState::Confirmed | BenefitState::Validated => None,
        }
    }
}

impl std::fmt::Display for BenefitState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BenefitState::Draft => write!(f, "draft"),
            BenefitState::Confirmed => write!(f, "confirmed"),
            BenefitState::Validated => write!(f, "validated"),
            BenefitState::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// The canonical identity of a benefit among active records.
///
/// Two active benefits may never share a key. Ordering is by start, end,
/// employee, then type, which gives duplicate detection a stable order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BenefitKey {
    /// Start of the benefit.
    pub date_start: DateTime<Utc>,
    /// End of the benefit.
    pub date_stop: DateTime<Utc>,
    /// Owning employee.
    pub employee_id: EmployeeId,
    /// Benefit type, if any.
    pub benefit_type_id: Option<BenefitTypeId>,
}

/// A persisted benefit record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Benefit {
    /// Unique identifier assigned by the store.
    pub id: BenefitId,
    /// Display name.
    pub name: String,
    /// The employee this benefit is assigned to.
    pub employee_id: EmployeeId,
    /// Start of the benefit (UTC).
    pub date_start: DateTime<Utc>,
    /// End of the benefit (UTC).
    pub date_stop: DateTime<Utc>,
    /// Length of the benefit in hours, kept in sync with `date_stop`.
    pub duration: Decimal,
    /// The benefit type, if one has been assigned.
    pub benefit_type_id: Option<BenefitTypeId>,
    /// Lifecycle state.
    pub state: BenefitState,
    /// Set when the benefit has an unresolved conflict.
    pub display_warning: bool,
    /// Pending leave the benefit conflicts with.
    pub leave_id: Option<LeaveId>,
    /// False once the benefit is cancelled.
    pub active: bool,
}

impl Benefit {
    /// Returns the unique key of this benefit.
    pub fn key(&self) -> BenefitKey {
        BenefitKey {
            date_start: self.date_start,
            date_stop: self.date_stop,
            employee_id: self.employee_id,
            benefit_type_id: self.benefit_type_id,
        }
    }

    /// Applies a set of changes, keeping duration and end consistent.
    ///
    /// A changed duration moves the end; otherwise a changed start or end
    /// recomputes the duration. Writing `Draft` or `Cancelled` forces the
    /// active flag.
    pub(crate) fn apply(&mut self, changes: &BenefitChanges) -> EngineResult<()> {
        if let Some(state) = changes.state
            && !self.state.can_transition_to(state)
        {
            return Err(EngineError::InvalidStateTransition {
                benefit_id: self.id,
                from: self.state,
                to: state,
            });
        }

        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(benefit_type_id) = changes.benefit_type_id {
            self.benefit_type_id = benefit_type_id;
        }
        if let Some(date_start) = changes.date_start {
            self.date_start = date_start;
        }

        match (changes.duration, changes.date_stop) {
            (Some(duration), _) if !duration.is_zero() => {
                self.date_stop = add_hours(self.date_start, duration).ok_or_else(missing_end)?;
            }
            (_, Some(date_stop)) => self.date_stop = date_stop,
            _ => {}
        }
        self.duration = hours_between(self.date_start, self.date_stop);

        if let Some(display_warning) = changes.display_warning {
            self.display_warning = display_warning;
        }
        if let Some(leave_id) = changes.leave_id {
            self.leave_id = leave_id;
        }
        if let Some(active) = changes.active {
            self.active = active;
        }
        if let Some(state) = changes.state {
            self.state = state;
            if let Some(active) = state.forced_active() {
                self.active = active;
            }
        }

        self.check_constraints()
    }

    /// Checks the per-record constraints (end after start).
    pub(crate) fn check_constraints(&self) -> EngineResult<()> {
        if self.date_stop <= self.date_start {
            return Err(EngineError::ConstraintViolation {
                constraint: Constraint::BenefitStartBeforeEnd,
                message: "Starting time should be before end time.".to_string(),
            });
        }
        Ok(())
    }
}

/// Values used to create a benefit.
///
/// Either `date_stop` or a non-zero `duration` must be given; when both are
/// present the explicit end wins.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewBenefit {
    /// Display name.
    pub name: String,
    /// The employee the benefit belongs to.
    pub employee_id: EmployeeId,
    /// Start of the benefit (UTC).
    pub date_start: DateTime<Utc>,
    /// End of the benefit (UTC).
    #[serde(default)]
    pub date_stop: Option<DateTime<Utc>>,
    /// Length in hours, used when no end is given.
    #[serde(default)]
    pub duration: Option<Decimal>,
    /// Optional benefit type.
    #[serde(default)]
    pub benefit_type_id: Option<BenefitTypeId>,
}

impl NewBenefit {
    /// Creates values for a benefit with an explicit start and end.
    pub fn new(
        name: impl Into<String>,
        employee_id: EmployeeId,
        date_start: DateTime<Utc>,
        date_stop: DateTime<Utc>,
        benefit_type_id: Option<BenefitTypeId>,
    ) -> Self {
        Self {
            name: name.into(),
            employee_id,
            date_start,
            date_stop: Some(date_stop),
            duration: None,
            benefit_type_id,
        }
    }

    /// Returns the end of the benefit, deriving it from the duration if needed.
    pub fn resolved_stop(&self) -> Option<DateTime<Utc>> {
        self.date_stop.or_else(|| {
            self.duration
                .filter(|duration| !duration.is_zero())
                .and_then(|duration| add_hours(self.date_start, duration))
        })
    }

    /// Returns the unique key these values would produce, if they have an end.
    pub fn key(&self) -> Option<BenefitKey> {
        self.resolved_stop().map(|date_stop| BenefitKey {
            date_start: self.date_start,
            date_stop,
            employee_id: self.employee_id,
            benefit_type_id: self.benefit_type_id,
        })
    }

    /// Builds the persisted record in draft state.
    pub(crate) fn into_benefit(self, id: BenefitId) -> EngineResult<Benefit> {
        let date_stop = self.resolved_stop().ok_or_else(missing_end)?;
        let benefit = Benefit {
            id,
            name: self.name,
            employee_id: self.employee_id,
            date_start: self.date_start,
            date_stop,
            duration: hours_between(self.date_start, date_stop),
            benefit_type_id: self.benefit_type_id,
            state: BenefitState::Draft,
            display_warning: false,
            leave_id: None,
            active: true,
        };
        benefit.check_constraints()?;
        Ok(benefit)
    }
}

/// Field changes for a benefit write. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BenefitChanges {
    /// New display name.
    pub name: Option<String>,
    /// New start.
    pub date_start: Option<DateTime<Utc>>,
    /// New end; the duration follows.
    pub date_stop: Option<DateTime<Utc>>,
    /// New duration in hours; the end follows.
    pub duration: Option<Decimal>,
    /// New benefit type (`Some(None)` clears it).
    pub benefit_type_id: Option<Option<BenefitTypeId>>,
    /// New lifecycle state.
    pub state: Option<BenefitState>,
    /// New warning flag.
    pub display_warning: Option<bool>,
    /// New leave link (`Some(None)` clears it).
    pub leave_id: Option<Option<LeaveId>>,
    /// New active flag; overridden by states that force it.
    pub active: Option<bool>,
}

impl BenefitChanges {
    /// Changes that only move the benefit to `state`.
    pub fn state(state: BenefitState) -> Self {
        Self {
            state: Some(state),
            ..Self::default()
        }
    }

    /// Changes that only set the warning flag.
    pub fn warning(display_warning: bool) -> Self {
        Self {
            display_warning: Some(display_warning),
            ..Self::default()
        }
    }

    /// Adds a leave link to these changes.
    pub fn with_leave(mut self, leave_id: LeaveId) -> Self {
        self.leave_id = Some(Some(leave_id));
        self
    }
}

/// Returns the number of hours between two timestamps.
///
/// # Examples
///
/// ```
/// use benefit_engine::models::hours_between;
/// use chrono::{TimeZone, Utc};
/// use rust_decimal::Decimal;
///
/// let start = Utc.with_ymd_and_hms(2026, 1, 14, 9, 0, 0).unwrap();
/// let stop = Utc.with_ymd_and_hms(2026, 1, 14, 17, 30, 0).unwrap();
/// assert_eq!(hours_between(start, stop), Decimal::new(85, 1));
/// ```
pub fn hours_between(start: DateTime<Utc>, stop: DateTime<Utc>) -> Decimal {
    let seconds = (stop - start).num_seconds();
    (Decimal::from(seconds) / Decimal::from(SECONDS_PER_HOUR)).normalize()
}

/// Adds a fractional number of hours to a timestamp, to the nearest second.
///
/// Returns `None` if the result, or the duration in seconds, is out of range.
pub fn add_hours(start: DateTime<Utc>, hours: Decimal) -> Option<DateTime<Utc>> {
    let seconds = hours
        .checked_mul(Decimal::from(SECONDS_PER_HOUR))?
        .round()
        .to_i64()?;
    start.checked_add_signed(TimeDelta::try_seconds(seconds)?)
}

fn missing_end() -> EngineError {
    EngineError::ConstraintViolation {
        constraint: Constraint::BenefitHasEnd,
        message: "Benefit must end. Please define an end date or a duration.".to_string(),
    }
}
