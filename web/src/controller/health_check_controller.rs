use super::ApiResponse;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use service::AppState;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    status: String,
    active_streams: usize,
    /// Open streams per profile name.
    streams: BTreeMap<String, usize>,
}

/// GET the server health and the number of open streams
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthStatus),
        (status = 500, description = "Internal Server Error")
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    let registry = app_state.sse_manager.registry();
    let status = HealthStatus {
        status: "healthy".to_string(),
        active_streams: registry.len(),
        streams: registry.counts_by_profile().into_iter().collect(),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::new(StatusCode::OK.into(), status)),
    )
}
