use crate::response::config_summary::{ConfigReport, ConfigSummary};
use crate::AppState;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;

/// GET the effective TikTok configuration (the client secret is never included)
#[utoipa::path(
    get,
    path = "/test/config",
    responses(
        (status = 200, description = "Configuration summary", body = ConfigReport),
    )
)]
pub async fn test_config(State(app_state): State<AppState>) -> impl IntoResponse {
    Json(ConfigReport {
        status: "OK".to_string(),
        message: "Configuration loaded".to_string(),
        config: ConfigSummary::new(app_state.config(), Utc::now().to_rfc3339()),
    })
}
