//! Request types for the Benefit Engine API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{BenefitId, NewBenefit};

/// Request body for the endpoints acting on a set of benefits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenefitIdsRequest {
    /// The benefits to act on.
    pub ids: Vec<BenefitId>,
}

/// Request body for `POST /benefits/generate`.
///
/// Benefits already present within the period are not created again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Start of the period to look for existing benefits in.
    pub date_start: DateTime<Utc>,
    /// End of the period to look for existing benefits in.
    pub date_stop: DateTime<Utc>,
    /// The benefits to create.
    pub benefits: Vec<NewBenefit>,
}
