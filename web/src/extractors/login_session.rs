use crate::error::{Error, WebErrorKind};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use domain::SessionId;
use log::*;
use tower_sessions::Session;
use uuid::Uuid;

/// Key under which the login session id is kept in the cookie session.
const LOGIN_SESSION_KEY: &str = "login_session_id";

/// The caller's login session.
///
/// The cookie session only ever holds the opaque [`SessionId`]; the pending
/// authorization and tokens it refers to stay server side. Extracting this
/// creates the id when the browser has none yet.
pub(crate) struct LoginSession {
    pub id: SessionId,
    pub session: Session,
}

impl LoginSession {
    /// The id already bound to `session`, without creating one.
    pub async fn current(session: &Session) -> Result<Option<SessionId>, Error> {
        session
            .get::<SessionId>(LOGIN_SESSION_KEY)
            .await
            .map_err(session_error)
    }

    /// Move the session to a fresh cookie id, keeping its data.
    ///
    /// The record under the old id is deleted, so a cookie value known before
    /// the call no longer reaches this login session.
    pub async fn rotate_id(&self) -> Result<(), Error> {
        self.session.cycle_id().await.map_err(session_error)
    }

    /// Destroy the cookie session and its record.
    pub async fn destroy(self) -> Result<(), Error> {
        self.session.flush().await.map_err(session_error)
    }
}

impl<S> FromRequestParts<S> for LoginSession
where
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|(status, msg)| {
                error!("Session layer missing ({}): {}", status, msg);
                Error::Web(WebErrorKind::Session)
            })?;

        let id = match LoginSession::current(&session).await? {
            Some(id) => id,
            None => {
                let id = SessionId::new(Uuid::new_v4().to_string());
                session
                    .insert(LOGIN_SESSION_KEY, &id)
                    .await
                    .map_err(session_error)?;
                trace!("Created login session {}", id);
                id
            }
        };

        Ok(LoginSession { id, session })
    }
}

fn session_error(err: tower_sessions::session::Error) -> Error {
    warn!("Cookie session error: {:?}", err);
    Error::Web(WebErrorKind::Session)
}
