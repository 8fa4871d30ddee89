//! Response types for the Benefit Engine API.
//!
//! This module defines the success bodies, the error response structure
//! and the mapping from engine errors to HTTP status codes.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::{Benefit, BenefitId};

/// Response body for `POST /benefits/validate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidateResponse {
    /// True if the batch was validated.
    pub validated: bool,
    /// Benefits that now carry a warning.
    pub flagged: Vec<BenefitId>,
}

/// Response body for `POST /benefits/check`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckResponse {
    /// True if any conflict was found.
    pub has_errors: bool,
    /// Benefits that now carry a warning.
    pub flagged: Vec<BenefitId>,
}

/// Response body for `POST /benefits/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateResponse {
    /// The benefits actually created.
    pub created: Vec<Benefit>,
}

/// API error response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code for programmatic handling.
    pub code: String,
    /// Human-readable error message.
    pub message: String,
    /// Optional details about the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a new API error with details.
    pub fn with_details(
        code: impl Into<String>,
        message: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            details: Some(details.into()),
        }
    }

    /// Creates a validation error response.
    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new("VALIDATION_ERROR", message)
    }

    /// Creates a malformed JSON error response.
    pub fn malformed_json(message: impl Into<String>) -> Self {
        Self::new("MALFORMED_JSON", message)
    }
}

/// API error with HTTP status code.
pub struct ApiErrorResponse {
    /// The HTTP status code.
    pub status: StatusCode,
    /// The error body.
    pub error: ApiError,
}

impl ApiErrorResponse {
    fn new(status: StatusCode, code: &str, error: &EngineError, details: impl Into<String>) -> Self {
        Self {
            status,
            error: ApiError::with_details(code, error.to_string(), details),
        }
    }
}

impl IntoResponse for ApiErrorResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self.error)).into_response()
    }
}

impl From<EngineError> for ApiErrorResponse {
    fn from(error: EngineError) -> Self {
        match &error {
            EngineError::ConfigNotFound { .. } | EngineError::ConfigParseError { .. } => {
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "CONFIG_ERROR",
                    &error,
                    "The engine configuration could not be loaded",
                )
            }
            EngineError::ConstraintViolation { constraint, message } => Self {
                status: if error.is_unique_violation() {
                    StatusCode::CONFLICT
                } else {
                    StatusCode::BAD_REQUEST
                },
                error: ApiError::with_details(
                    "CONSTRAINT_VIOLATION",
                    message.clone(),
                    format!("Constraint '{}' violated", constraint),
                ),
            },
            EngineError::BenefitNotFound { .. } => Self::new(
                StatusCode::NOT_FOUND,
                "BENEFIT_NOT_FOUND",
                &error,
                "No benefit exists with this identifier",
            ),
            EngineError::BenefitTypeNotFound { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "BENEFIT_TYPE_NOT_FOUND",
                &error,
                "The benefit type is not part of the catalogue",
            ),
            EngineError::EmployeeNotFound { .. } => Self::new(
                StatusCode::BAD_REQUEST,
                "EMPLOYEE_NOT_FOUND",
                &error,
                "The benefit refers to an unknown employee",
            ),
            EngineError::NoLinkedLeave { .. } => Self::new(
                StatusCode::NOT_FOUND,
                "NO_LINKED_LEAVE",
                &error,
                "The benefit does not conflict with a pending leave",
            ),
            EngineError::InvalidStateTransition { .. } => Self::new(
                StatusCode::CONFLICT,
                "INVALID_STATE_TRANSITION",
                &error,
                "The benefit lifecycle does not allow this change",
            ),
            EngineError::MultiDayAttendance { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "MULTI_DAY_ATTENDANCE",
                &error,
                "Attendance benefits must start and end on the same local day",
            ),
            EngineError::NonexistentLocalTime { .. } => Self::new(
                StatusCode::UNPROCESSABLE_ENTITY,
                "NONEXISTENT_LOCAL_TIME",
                &error,
                "A day boundary falls in a daylight saving gap",
            ),
            EngineError::Store { .. } => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "STORE_ERROR",
                &error,
                "The record store could not complete the request",
            ),
        }
    }
}
