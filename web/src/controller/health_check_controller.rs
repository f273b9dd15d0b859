use crate::response::health::HealthStatus;
use crate::AppState;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

/// GET service liveness and uptime
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "API router is up and responding to requests", body = HealthStatus),
    )
)]
pub async fn health_check(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(HealthStatus {
        status: "OK".to_string(),
        timestamp: Utc::now().to_rfc3339(),
        uptime_secs: app_state.started_at.elapsed().as_secs(),
        environment: app_state.config().runtime_env().to_string(),
    })
}
