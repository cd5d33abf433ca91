use axum::{Json, extract::State, http::StatusCode};
use serde::Serialize;
use tracing::{debug, error};
use utoipa::ToSchema;

use crate::app_state::AppState;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    status: String,
    database: String,
    /// Configured feed sources.
    sources: usize,
    /// Whether an ingestion cycle is in flight right now.
    ingesting: bool,
}

#[utoipa::path(
    get,
    path = "/healthz",
    tag = "health",
    responses(
        (status = 200, description = "Store reachable", body = HealthResponse),
        (status = 503, description = "Store unreachable")
    )
)]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, StatusCode> {
    if let Err(e) = state.store.ping().await {
        error!(error = %e, "article store health check failed");
        return Err(StatusCode::SERVICE_UNAVAILABLE);
    }

    debug!("health check passed");
    Ok(Json(HealthResponse {
        status: "OK".to_string(),
        database: "healthy".to_string(),
        sources: state.pipeline.sources().len(),
        ingesting: state.pipeline.is_running(),
    }))
}
