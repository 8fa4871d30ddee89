//! HTTP API module for the Benefit Engine.
//!
//! This module provides the REST API endpoints for validating, checking
//! and generating benefits, and for opening the leave a benefit conflicts
//! with.

mod handlers;
mod request;
mod response;
mod state;

pub use handlers::create_router;
pub use request::{BenefitIdsRequest, GenerateRequest};
pub use response::{ApiError, CheckResponse, GenerateResponse, ValidateResponse};
pub use state::AppState;
