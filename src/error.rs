//! Error types for the Benefit Engine.
//!
//! This module provides strongly-typed errors using the `thiserror` crate
//! for all error conditions that can occur while storing, checking and
//! validating benefits.

use chrono::NaiveDateTime;
use thiserror::Error;

use crate::models::{BenefitId, BenefitState, EmployeeId};

/// A write-time rule that a benefit record must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constraint {
    /// (start, end, employee, type) must be unique among active benefits.
    Unique,
    /// A benefit needs an end timestamp or a non-zero duration.
    BenefitHasEnd,
    /// The end timestamp must be strictly after the start timestamp.
    BenefitStartBeforeEnd,
}

impl std::fmt::Display for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Constraint::Unique => write!(f, "unique"),
            Constraint::BenefitHasEnd => write!(f, "benefit_has_end"),
            Constraint::BenefitStartBeforeEnd => write!(f, "benefit_start_before_end"),
        }
    }
}

/// The main error type for the Benefit Engine.
///
/// Scheduling and leave conflicts are not errors: they are
/// recorded as warning flags on the benefits themselves.
///
/// # Example
///
/// ```
/// use benefit_engine::error::EngineError;
///
/// let error = EngineError::ConfigNotFound {
///     path: "/missing/settings.yaml".to_string(),
/// };
/// assert_eq!(error.to_string(), "Configuration file not found: /missing/settings.yaml");
/// ```
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration file was not found at the specified path.
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// The path that was not found.
        path: String,
    },

    /// Configuration file could not be parsed.
    #[error("Failed to parse configuration file '{path}': {message}")]
    ConfigParseError {
        /// The path to the file that failed to parse.
        path: String,
        /// A description of the parse error.
        message: String,
    },

    /// A benefit write broke one of the record constraints.
    #[error("Constraint '{constraint}' violated: {message}")]
    ConstraintViolation {
        /// The violated rule.
        constraint: Constraint,
        /// The user-facing description of the rule.
        message: String,
    },

    /// No benefit exists with the given identifier.
    #[error("Benefit not found: {id}")]
    BenefitNotFound {
        /// The missing benefit.
        id: BenefitId,
    },

    /// No benefit type exists with the given identifier or code.
    #[error("Benefit type not found: {reference}")]
    BenefitTypeNotFound {
        /// The identifier or code that was looked up.
        reference: String,
    },

    /// No employee exists with the given identifier.
    #[error("Employee not found: {id}")]
    EmployeeNotFound {
        /// The missing employee.
        id: EmployeeId,
    },

    /// A benefit was asked to open its leave but has none linked.
    #[error("Benefit {benefit_id} has no linked leave")]
    NoLinkedLeave {
        /// The benefit without a leave.
        benefit_id: BenefitId,
    },

    /// A state change that the benefit lifecycle does not allow.
    #[error("Benefit {benefit_id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// The benefit being written.
        benefit_id: BenefitId,
        /// The current state.
        from: BenefitState,
        /// The requested state.
        to: BenefitState,
    },

    /// An attendance benefit still covered several local days when
    /// projected into the calendar.
    #[error("You can't validate a benefit that covers several days (benefit {benefit_id})")]
    MultiDayAttendance {
        /// The offending benefit.
        benefit_id: BenefitId,
    },

    /// A local day boundary does not exist in the employee's timezone.
    #[error("Local time {local} does not exist for employee {employee_id}")]
    NonexistentLocalTime {
        /// The employee whose timezone was used.
        employee_id: EmployeeId,
        /// The local wall-clock time that could not be resolved.
        local: NaiveDateTime,
    },

    /// The record store could not complete an operation.
    #[error("Record store error: {message}")]
    Store {
        /// A description of the failure.
        message: String,
    },
}

impl EngineError {
    /// Returns true if this error is a uniqueness violation.
    pub fn is_unique_violation(&self) -> bool {
        matches!(
            self,
            EngineError::ConstraintViolation {
                constraint: Constraint::Unique,
                ..
            }
        )
    }
}

/// A type alias for Results that return EngineError.
pub type EngineResult<T> = Result<T, EngineError>;
