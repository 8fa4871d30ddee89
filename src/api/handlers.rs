//! HTTP request handlers for the Benefit Engine API.
//!
//! This module contains the handler functions for all API endpoints.

use std::time::Instant;

use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::EngineError;
use crate::models::BenefitId;
use crate::scheduling::{action_leave, check_for_errors, safe_duplicate_create, validate};
use crate::store::{Field, Filter, Operator, RecordStore, in_transaction};

use super::request::{BenefitIdsRequest, GenerateRequest};
use super::response::{
    ApiError, ApiErrorResponse, CheckResponse, GenerateResponse, ValidateResponse,
};
use super::state::AppState;

/// Creates the API router with all endpoints.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/benefits/validate", post(validate_handler))
        .route("/benefits/check", post(check_handler))
        .route("/benefits/generate", post(generate_handler))
        .route("/benefits/:id/leave", get(leave_handler))
        .with_state(state)
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        Json(body),
    )
        .into_response()
}

fn error_response(correlation_id: Uuid, err: EngineError, context: &str) -> Response {
    warn!(correlation_id = %correlation_id, error = %err, "{}", context);
    ApiErrorResponse::from(err).into_response()
}

fn rejection_response(correlation_id: Uuid, rejection: JsonRejection) -> Response {
    let error = match rejection {
        JsonRejection::JsonDataError(err) => {
            let body_text = err.body_text();
            warn!(
                correlation_id = %correlation_id,
                error = %body_text,
                "JSON data error"
            );
            if body_text.contains("missing field") {
                ApiError::validation_error(body_text)
            } else {
                ApiError::malformed_json(body_text)
            }
        }
        JsonRejection::JsonSyntaxError(err) => {
            warn!(
                correlation_id = %correlation_id,
                error = %err,
                "JSON syntax error"
            );
            ApiError::malformed_json(format!("Invalid JSON syntax: {}", err))
        }
        JsonRejection::MissingJsonContentType(_) => {
            ApiError::new("MISSING_CONTENT_TYPE", "Content-Type must be application/json")
        }
        _ => ApiError::malformed_json("Failed to parse request body"),
    };
    json_response(StatusCode::BAD_REQUEST, error)
}

/// Handler for `POST /benefits/validate`.
///
/// Validates the given benefits as one batch and reports which of them
/// carry a warning afterwards.
async fn validate_handler(
    State(state): State<AppState>,
    payload: Result<Json<BenefitIdsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing validation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let start_time = Instant::now();
    let mut store = state.store().lock().await;
    match validate(&mut *store, state.settings(), &request.ids) {
        Ok(outcome) => {
            info!(
                correlation_id = %correlation_id,
                requested = request.ids.len(),
                validated = outcome.validated,
                duration_us = start_time.elapsed().as_micros(),
                "Validation completed"
            );
            json_response(
                StatusCode::OK,
                ValidateResponse {
                    validated: outcome.validated,
                    flagged: outcome.report.flagged().into_iter().collect(),
                },
            )
        }
        Err(err) => error_response(correlation_id, err, "Validation failed"),
    }
}

/// Handler for `POST /benefits/check`.
///
/// Runs the conflict check on the active benefits among the given ids and
/// flags the offenders, without changing any state.
async fn check_handler(
    State(state): State<AppState>,
    payload: Result<Json<BenefitIdsRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing conflict check request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let mut store = state.store().lock().await;
    let result = in_transaction(&mut *store, |store| {
        let filter = Filter::new().and(Field::Id, Operator::In, request.ids.as_slice());
        let records = store.search_benefits(&filter)?;
        check_for_errors(store, &records)
    });

    match result {
        Ok(report) => {
            info!(
                correlation_id = %correlation_id,
                has_errors = report.has_errors(),
                "Conflict check completed"
            );
            json_response(
                StatusCode::OK,
                CheckResponse {
                    has_errors: report.has_errors(),
                    flagged: report.flagged().into_iter().collect(),
                },
            )
        }
        Err(err) => error_response(correlation_id, err, "Conflict check failed"),
    }
}

/// Handler for `POST /benefits/generate`.
///
/// Creates the given benefits, skipping those that already exist in the
/// period.
async fn generate_handler(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Response {
    let correlation_id = Uuid::new_v4();
    info!(correlation_id = %correlation_id, "Processing generation request");

    let request = match payload {
        Ok(Json(req)) => req,
        Err(rejection) => return rejection_response(correlation_id, rejection),
    };

    let requested = request.benefits.len();
    let mut store = state.store().lock().await;
    match safe_duplicate_create(
        &mut *store,
        request.benefits,
        request.date_start,
        request.date_stop,
    ) {
        Ok(created) => {
            info!(
                correlation_id = %correlation_id,
                requested,
                created = created.len(),
                "Generation completed"
            );
            json_response(StatusCode::OK, GenerateResponse { created })
        }
        Err(err) => error_response(correlation_id, err, "Generation failed"),
    }
}

/// Handler for `GET /benefits/:id/leave`.
///
/// Returns the action opening the pending leave a benefit conflicts with.
async fn leave_handler(State(state): State<AppState>, Path(id): Path<u64>) -> Response {
    let correlation_id = Uuid::new_v4();
    let benefit_id = BenefitId(id);
    info!(correlation_id = %correlation_id, benefit_id = %benefit_id, "Opening linked leave");

    let store = state.store().lock().await;
    match action_leave(&*store, benefit_id) {
        Ok(action) => json_response(StatusCode::OK, action),
        Err(err) => error_response(correlation_id, err, "Linked leave lookup failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigLoader;
    use crate::models::{CalendarId, Employee, EmployeeId, ResourceId};
    use crate::store::InMemoryStore;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    fn create_test_state() -> AppState {
        let config = ConfigLoader::load("./config/default").expect("Failed to load config");
        let mut store: InMemoryStore = config.seeded_store();
        store.insert_employee(Employee {
            id: EmployeeId(1),
            name: "Alice".to_string(),
            tz: None,
            resource_id: ResourceId(1),
            calendar_id: CalendarId(1),
        });
        AppState::with_store(config, store)
    }

    async fn send(router: Router, method: &str, uri: &str, body: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_malformed_json_returns_400() {
        let router = create_router(create_test_state());
        let (status, body) = send(router, "POST", "/benefits/validate", "{ not json").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "MALFORMED_JSON");
    }

    #[tokio::test]
    async fn test_missing_ids_returns_validation_error() {
        let router = create_router(create_test_state());
        let (status, body) = send(router, "POST", "/benefits/check", "{}").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "VALIDATION_ERROR");
        assert!(error.message.contains("missing field"));
    }

    #[tokio::test]
    async fn test_empty_validation_succeeds() {
        let router = create_router(create_test_state());
        let (status, body) = send(router, "POST", "/benefits/validate", r#"{ "ids": [] }"#).await;

        assert_eq!(status, StatusCode::OK);
        let response: ValidateResponse = serde_json::from_slice(&body).unwrap();
        assert!(response.validated);
        assert!(response.flagged.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_benefit_leave_returns_404() {
        let router = create_router(create_test_state());
        let (status, body) = send(router, "GET", "/benefits/42/leave", "").await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "BENEFIT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_engine_error_response_is_json() {
        let response = error_response(
            Uuid::new_v4(),
            EngineError::NoLinkedLeave {
                benefit_id: BenefitId(7),
            },
            "Leave lookup failed",
        );

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "NO_LINKED_LEAVE");
    }

    #[tokio::test]
    async fn test_generate_without_end_returns_400() {
        let router = create_router(create_test_state());
        let body = r#"{
            "date_start": "2026-01-01T00:00:00Z",
            "date_stop": "2026-01-31T23:59:59Z",
            "benefits": [
                { "name": "Open", "employee_id": 1, "date_start": "2026-01-14T09:00:00Z" }
            ]
        }"#;
        let (status, body) = send(router, "POST", "/benefits/generate", body).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let error: ApiError = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.code, "CONSTRAINT_VIOLATION");
    }
}
