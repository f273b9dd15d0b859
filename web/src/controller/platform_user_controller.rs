use crate::{AppState, Error};

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use domain::{platform_user, platform_users};

/// GET all TikTok profiles seen at login, most recently updated first
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Stored profiles", body = [platform_users::Model]),
        (status = 500, description = "Internal Server Error"),
    )
)]
pub async fn index(State(app_state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let users = platform_user::find_all(app_state.db_conn_ref()).await?;
    Ok(Json(users))
}
