//! Error types for the `domain` layer.
use connect_auth::error::{
    Error as ConnectAuthError, ErrorKind as ConnectAuthErrorKind, OAuthErrorKind,
};
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use serde_json::Value;
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree with `domain::error::Error` as the
/// root, holding an `error_kind` that names what went wrong in this layer or below it,
/// and the original error as `source`. `web` maps the kinds to HTTP responses without
/// depending on `connect-auth` or `entity_api` directly.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Auth(AuthErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    /// Storing the profile of a logged in account failed. Never fatal to the login.
    ProfilePersist,
    Other(String),
}

/// Entity errors reduced to what the `domain` layer cares about.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    /// A TikTok resource API answered with a failure; its body is kept as returned.
    Upstream(Value),
    Other(String),
}

/// Failures of the login flow and of access to protected resources.
#[derive(Debug, PartialEq)]
pub enum AuthErrorKind {
    RandomnessUnavailable,
    ProviderDenied,
    MissingAuthorizationCode,
    StateMismatch,
    ExchangeUnreachable,
    ExchangeRejected,
    ExchangeProtocolError,
    /// No tokens are held for the session, whether it never logged in or has expired.
    Unauthenticated,
}

impl Error {
    /// Diagnostic value for the `details` field of an error response.
    pub fn details(&self) -> Value {
        if let DomainErrorKind::External(ExternalErrorKind::Upstream(body)) = &self.error_kind {
            return body.clone();
        }

        match self.source.as_ref() {
            Some(source) => match source.downcast_ref::<ConnectAuthError>() {
                Some(auth_error) => auth_error.details(),
                None => Value::String(source.to_string()),
            },
            None => Value::Null,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {:?}", self.error_kind)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let entity_error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => EntityErrorKind::NotFound,
            EntityApiErrorKind::ValidationError => EntityErrorKind::Invalid,
            EntityApiErrorKind::SystemError => EntityErrorKind::DbTransaction,
            EntityApiErrorKind::RecordNotUpdated => {
                EntityErrorKind::Other("Record not updated".to_string())
            }
        };

        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(entity_error_kind)),
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        // Errors that result from issues building the reqwest::Client instance. This
        // type of error will occur prior to any network calls being made.
        if err.is_builder() {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::Internal(InternalErrorKind::Other(
                    "Failed to build reqwest client".to_string(),
                )),
            }
        } else {
            Error {
                source: Some(Box::new(err)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
            }
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: DomainErrorKind::External(ExternalErrorKind::Network),
        }
    }
}

impl From<ConnectAuthError> for Error {
    fn from(err: ConnectAuthError) -> Self {
        let error_kind = match &err.error_kind {
            ConnectAuthErrorKind::OAuth(kind) => DomainErrorKind::Auth(match kind {
                OAuthErrorKind::RandomnessUnavailable => AuthErrorKind::RandomnessUnavailable,
                OAuthErrorKind::ProviderDenied { .. } => AuthErrorKind::ProviderDenied,
                OAuthErrorKind::MissingAuthorizationCode => {
                    AuthErrorKind::MissingAuthorizationCode
                }
                OAuthErrorKind::StateMismatch => AuthErrorKind::StateMismatch,
                OAuthErrorKind::ExchangeUnreachable => AuthErrorKind::ExchangeUnreachable,
                OAuthErrorKind::ExchangeRejected(_) => AuthErrorKind::ExchangeRejected,
                OAuthErrorKind::ExchangeProtocolError => AuthErrorKind::ExchangeProtocolError,
            }),
            ConnectAuthErrorKind::Http(_) => DomainErrorKind::External(ExternalErrorKind::Network),
            ConnectAuthErrorKind::Storage(_) => {
                DomainErrorKind::Internal(InternalErrorKind::Other(err.to_string()))
            }
        };
        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

/// Helper for configuration errors, which carry only a message.
pub(crate) fn config_error(message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::Config),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use connect_auth::error::oauth_error;
    use serde_json::json;

    #[test]
    fn oauth_errors_map_to_auth_kinds_and_keep_details() {
        let body = json!({"error": "invalid_grant", "error_description": "expired"});
        let err: Error =
            oauth_error(OAuthErrorKind::ExchangeRejected(body.clone()), "rejected").into();

        assert_eq!(
            err.error_kind,
            DomainErrorKind::Auth(AuthErrorKind::ExchangeRejected)
        );
        assert_eq!(err.details(), body);
    }

    #[test]
    fn upstream_details_are_the_raw_body() {
        let body = json!({"error": {"code": "access_token_invalid"}});
        let err = Error {
            source: None,
            error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream(body.clone())),
        };
        assert_eq!(err.details(), body);
    }

    #[test]
    fn entity_not_found_maps_to_not_found() {
        let err: Error = EntityApiError {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
        .into();
        assert_eq!(
            err.error_kind,
            DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
        );
    }

    #[test]
    fn config_error_details_carry_the_message() {
        let err = config_error("TIKTOK_CLIENT_KEY is not set");
        assert_eq!(err.details(), json!("TIKTOK_CLIENT_KEY is not set"));
    }
}
