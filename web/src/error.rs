use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

use domain::error::{
    AuthErrorKind, DomainErrorKind, EntityErrorKind, Error as DomainError, ExternalErrorKind,
    InternalErrorKind,
};

extern crate log;
use log::*;

pub type Result<T> = core::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
    Domain(DomainError),
    Web(WebErrorKind),
}

/// Failures that originate in the web layer itself.
#[derive(Debug, PartialEq)]
pub enum WebErrorKind {
    /// The cookie session could not be read or written.
    Session,
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        write!(fmt, "{self:?}")
    }
}

// List of possible StatusCode variants https://docs.rs/http/latest/http/status/struct.StatusCode.html#associatedconstant.UNPROCESSABLE_ENTITY
impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Domain(domain_error) => {
                let details = domain_error.details();
                let (status, message) = status_and_message(&domain_error.error_kind);
                if status.is_server_error() {
                    error!("{}: {}", message, domain_error);
                } else {
                    debug!("{}: {}", message, domain_error);
                }
                error_response(status, message, details)
            }
            Error::Web(WebErrorKind::Session) => error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Session unavailable",
                Value::Null,
            ),
        }
    }
}

fn status_and_message(kind: &DomainErrorKind) -> (StatusCode, &'static str) {
    match kind {
        DomainErrorKind::Auth(auth_error_kind) => match auth_error_kind {
            AuthErrorKind::RandomnessUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to start authentication",
            ),
            AuthErrorKind::ProviderDenied => (StatusCode::BAD_REQUEST, "Authorization denied"),
            AuthErrorKind::MissingAuthorizationCode => {
                (StatusCode::BAD_REQUEST, "Authorization code not found")
            }
            AuthErrorKind::StateMismatch => (StatusCode::BAD_REQUEST, "Invalid state parameter"),
            AuthErrorKind::ExchangeRejected => {
                (StatusCode::BAD_REQUEST, "Failed to obtain access token")
            }
            AuthErrorKind::ExchangeUnreachable => {
                (StatusCode::BAD_GATEWAY, "Token endpoint unreachable")
            }
            AuthErrorKind::ExchangeProtocolError => {
                (StatusCode::BAD_GATEWAY, "Invalid response from token endpoint")
            }
            AuthErrorKind::Unauthenticated => (StatusCode::UNAUTHORIZED, "Access token not found"),
        },
        DomainErrorKind::Internal(internal_error_kind) => match internal_error_kind {
            InternalErrorKind::Entity(EntityErrorKind::NotFound) => {
                (StatusCode::NOT_FOUND, "Not found")
            }
            InternalErrorKind::Entity(EntityErrorKind::Invalid) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "Unprocessable entity")
            }
            InternalErrorKind::Config => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Server misconfigured")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error"),
        },
        DomainErrorKind::External(external_error_kind) => match external_error_kind {
            ExternalErrorKind::Network => (StatusCode::BAD_GATEWAY, "TikTok API unreachable"),
            ExternalErrorKind::Upstream(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "TikTok API request failed")
            }
            ExternalErrorKind::Other(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Unexpected TikTok API response")
            }
        },
    }
}

/// JSON error body `{error, details}`; `details` is left out when there is nothing to show.
fn error_response(status: StatusCode, message: &str, details: Value) -> Response {
    let body = if details.is_null() {
        json!({ "error": message })
    } else {
        json!({ "error": message, "details": details })
    };
    (status, Json(body)).into_response()
}

impl<E> From<E> for Error
where
    E: Into<DomainError>,
{
    fn from(err: E) -> Self {
        Self::Domain(err.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn domain_error(error_kind: DomainErrorKind) -> Error {
        Error::Domain(DomainError {
            source: None,
            error_kind,
        })
    }

    #[tokio::test]
    async fn unauthenticated_is_401_without_details() {
        let response = Error::from(domain::auth::unauthenticated()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_of(response).await, json!({"error": "Access token not found"}));
    }

    #[tokio::test]
    async fn upstream_failure_is_500_with_the_raw_body() {
        let upstream = json!({"error": {"code": "access_token_invalid"}});
        let response = domain_error(DomainErrorKind::External(ExternalErrorKind::Upstream(
            upstream.clone(),
        )))
        .into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_of(response).await["details"], upstream);
    }

    #[test]
    fn login_failures_map_to_expected_status_codes() {
        let cases = [
            (AuthErrorKind::RandomnessUnavailable, StatusCode::INTERNAL_SERVER_ERROR),
            (AuthErrorKind::ProviderDenied, StatusCode::BAD_REQUEST),
            (AuthErrorKind::MissingAuthorizationCode, StatusCode::BAD_REQUEST),
            (AuthErrorKind::StateMismatch, StatusCode::BAD_REQUEST),
            (AuthErrorKind::ExchangeRejected, StatusCode::BAD_REQUEST),
            (AuthErrorKind::ExchangeUnreachable, StatusCode::BAD_GATEWAY),
            (AuthErrorKind::ExchangeProtocolError, StatusCode::BAD_GATEWAY),
        ];
        for (kind, status) in cases {
            let (actual, _) = status_and_message(&DomainErrorKind::Auth(kind));
            assert_eq!(actual, status);
        }
    }
}
