//! DTO for the health endpoint.

use serde::Serialize;
use utoipa::ToSchema;

/// Health payload returned by the `/healthcheck` route.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Overall status: "ok" or "degraded".
    pub status: String,
    /// True while no durable store is installed.
    pub degraded: bool,
}

impl HealthResponse {
    /// The durable store is reachable.
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            degraded: false,
        }
    }

    /// No durable store is installed; votes fall back to staging.
    pub fn degraded() -> Self {
        Self {
            status: "degraded".to_string(),
            degraded: true,
        }
    }
}
