use axum::http::{Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use log::*;
use serde_json::json;

/// Answers requests that matched no route and no static file.
pub async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    debug!("No route for {} {}", method, uri.path());
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "Endpoint not found",
            "path": uri.path(),
            "method": method.as_str(),
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}
