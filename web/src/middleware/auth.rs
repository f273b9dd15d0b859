use crate::extractors::login_session::LoginSession;
use crate::{AppState, Error};
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use domain::{auth, SessionId, TokenRecord};
use tower_sessions::Session;

/// A login session that holds tokens, placed in request extensions by [`require_login`].
#[derive(Clone)]
pub(crate) struct Authenticated {
    pub session: SessionId,
    pub tokens: TokenRecord,
}

/// Authentication middleware that returns 401 Unauthorized unless the session holds tokens.
///
/// A browser that never logged in and one whose session expired get the same answer.
pub(crate) async fn require_login(
    State(app_state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> Result<Response, Error> {
    let id = LoginSession::current(&session)
        .await?
        .ok_or_else(auth::unauthenticated)?;
    let tokens = auth::require_tokens(&app_state.flow, &id).await?;

    request
        .extensions_mut()
        .insert(Authenticated { session: id, tokens });
    Ok(next.run(request).await)
}
