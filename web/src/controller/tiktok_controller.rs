//! Pass-through endpoints for the TikTok resource APIs.
//!
//! TikTok's response body is returned exactly as received.

use crate::middleware::auth::Authenticated;
use crate::{AppState, Error};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use log::*;

/// GET /user/info
#[utoipa::path(
    get,
    path = "/user/info",
    responses(
        (status = 200, description = "TikTok user info response, unchanged"),
        (status = 401, description = "Access token not found"),
        (status = 500, description = "TikTok API request failed"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn user_info(
    State(app_state): State<AppState>,
    Extension(authenticated): Extension<Authenticated>,
) -> Result<impl IntoResponse, Error> {
    debug!("Fetching user info for session {}", authenticated.session);
    let body = app_state
        .api
        .user_info(&authenticated.tokens.access_token)
        .await?;
    Ok(Json(body))
}

/// GET /user/videos
#[utoipa::path(
    get,
    path = "/user/videos",
    responses(
        (status = 200, description = "TikTok video list response, unchanged"),
        (status = 401, description = "Access token not found"),
        (status = 500, description = "TikTok API request failed"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn videos(
    State(app_state): State<AppState>,
    Extension(authenticated): Extension<Authenticated>,
) -> Result<impl IntoResponse, Error> {
    debug!("Fetching videos for session {}", authenticated.session);
    let body = app_state
        .api
        .video_list(&authenticated.tokens.access_token)
        .await?;
    Ok(Json(body))
}
