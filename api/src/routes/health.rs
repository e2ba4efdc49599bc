use std::time::Instant;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    /// Always `true` while the process is serving requests
    pub success: bool,
    pub message: String,
    /// Current server time in RFC 3339 format
    pub timestamp: String,
    /// Seconds since the server started
    pub uptime: f64,
}

/// Health check endpoint.
///
/// Liveness only: PostgREST and the geocoders are not probed, since every
/// game route degrades to offline fallbacks when they are down.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is running", body = HealthResponse),
    )
)]
pub async fn health_check(State(started_at): State<Instant>) -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        message: "Climate Farm API is running".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime: started_at.elapsed().as_secs_f64(),
    })
}
