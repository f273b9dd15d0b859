//! Controller for the TikTok login flow.
//!
//! These endpoints are reached through browser redirects, so failures answer
//! with a JSON error body rather than a redirect.

use crate::extractors::login_session::LoginSession;
use crate::middleware::auth::Authenticated;
use crate::response::token_info::TokenInfo;
use crate::{AppState, Error};

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect};
use axum::{Extension, Json};
use domain::{auth, CallbackParams};
use log::*;

/// GET /auth/login
///
/// Starts a login for the caller's session and redirects to TikTok.
#[utoipa::path(
    get,
    path = "/auth/login",
    responses(
        (status = 307, description = "Redirect to the TikTok authorization page"),
        (status = 500, description = "Failed to start authentication"),
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    login_session: LoginSession,
) -> Result<impl IntoResponse, Error> {
    let url = auth::begin_login(&app_state.flow, &login_session.id).await?;
    Ok(Redirect::temporary(&url))
}

/// GET /auth/callback
///
/// Where TikTok sends the browser back to. Validates the callback, exchanges
/// the code and records the account's profile. A successful login moves the
/// browser to a new session cookie.
#[utoipa::path(
    get,
    path = "/auth/callback",
    params(
        ("code" = Option<String>, Query, description = "Authorization code from TikTok"),
        ("state" = Option<String>, Query, description = "State issued at login"),
        ("error" = Option<String>, Query, description = "Error reported by TikTok"),
        ("error_description" = Option<String>, Query, description = "Error description reported by TikTok"),
    ),
    responses(
        (status = 303, description = "Redirect to the success page"),
        (status = 400, description = "Denied, missing code, invalid state or rejected exchange"),
        (status = 502, description = "Token endpoint unreachable or answered unexpectedly"),
    )
)]
pub async fn callback(
    State(app_state): State<AppState>,
    login_session: LoginSession,
    Query(params): Query<CallbackParams>,
) -> Result<impl IntoResponse, Error> {
    let outcome = auth::complete_login(
        app_state.db_conn_ref(),
        &app_state.flow,
        &app_state.api,
        app_state.cipher.as_ref(),
        &login_session.id,
        &params,
    )
    .await?;

    login_session.rotate_id().await?;

    info!(
        "Session {} logged in (profile stored: {})",
        login_session.id,
        outcome.profile.is_stored()
    );

    Ok(Redirect::to(app_state.config().success_redirect_path()))
}

/// GET /auth/logout
///
/// Drops the session's tokens and the cookie session itself.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Redirect to the logout page"),
        (status = 500, description = "Failed to log out"),
    )
)]
pub async fn logout(
    State(app_state): State<AppState>,
    login_session: LoginSession,
) -> Result<impl IntoResponse, Error> {
    auth::logout(&app_state.flow, &login_session.id).await?;
    login_session.destroy().await?;

    Ok(Redirect::to(app_state.config().logout_redirect_path()))
}

/// GET /auth/token-info
///
/// Describes the session's tokens without revealing them.
#[utoipa::path(
    get,
    path = "/auth/token-info",
    responses(
        (status = 200, description = "Token summary", body = TokenInfo),
        (status = 401, description = "Access token not found"),
    ),
    security(
        ("cookie_auth" = [])
    )
)]
pub async fn token_info(
    Extension(authenticated): Extension<Authenticated>,
) -> Result<impl IntoResponse, Error> {
    Ok(Json(TokenInfo::from(&authenticated.tokens)))
}
