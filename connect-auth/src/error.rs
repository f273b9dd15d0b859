//! Error types for the `connect-auth` crate.
//!
//! Follows the same pattern as domain::error with a root Error struct and error kind enums.

use std::error::Error as StdError;
use std::fmt;

use serde_json::{json, Value};

/// Top-level error type for connect-auth crate.
/// Holds error kind and optional source for error chaining.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: ErrorKind,
}

/// Major categories of errors in connect-auth.
#[derive(Debug, PartialEq)]
pub enum ErrorKind {
    OAuth(OAuthErrorKind),
    Storage(StorageErrorKind),
    Http(HttpErrorKind),
}

/// Errors from the authorization code flow.
///
/// Each variant is fatal to the login attempt it occurred in; the caller has to
/// start over with a fresh `/auth/login`.
#[derive(Debug, PartialEq)]
pub enum OAuthErrorKind {
    /// The OS entropy source could not produce random bytes.
    RandomnessUnavailable,
    /// The provider redirected back with an `error` parameter.
    ProviderDenied {
        error: String,
        description: Option<String>,
    },
    /// The callback carried no authorization code.
    MissingAuthorizationCode,
    /// The returned state does not match the one issued for this session.
    StateMismatch,
    /// The token endpoint could not be reached or timed out.
    ExchangeUnreachable,
    /// The token endpoint answered with an error body, kept verbatim.
    ExchangeRejected(Value),
    /// The token endpoint answered with something we cannot interpret.
    ExchangeProtocolError,
}

/// Errors from encrypting or decrypting tokens at rest.
#[derive(Debug, PartialEq)]
pub enum StorageErrorKind {
    EncryptionFailed,
    DecryptionFailed,
}

/// Errors from HTTP client operations.
#[derive(Debug, PartialEq)]
pub enum HttpErrorKind {
    BuilderFailed,
    RequestFailed,
    Network,
}

impl Error {
    /// Diagnostic payload suitable for the `details` field of an error response.
    ///
    /// Provider supplied detail is returned verbatim; otherwise the source message is used.
    pub fn details(&self) -> Value {
        match &self.error_kind {
            ErrorKind::OAuth(OAuthErrorKind::ProviderDenied { error, description }) => {
                json!({ "error": error, "error_description": description })
            }
            ErrorKind::OAuth(OAuthErrorKind::ExchangeRejected(body)) => body.clone(),
            _ => self
                .source
                .as_ref()
                .map(|e| Value::String(e.to_string()))
                .unwrap_or(Value::Null),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            ErrorKind::OAuth(kind) => write!(f, "OAuth error: {:?}", kind),
            ErrorKind::Storage(kind) => write!(f, "Storage error: {:?}", kind),
            ErrorKind::Http(kind) => write!(f, "HTTP error: {:?}", kind),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        let error_kind = if err.is_builder() {
            ErrorKind::Http(HttpErrorKind::BuilderFailed)
        } else if err.is_request() {
            ErrorKind::Http(HttpErrorKind::RequestFailed)
        } else {
            ErrorKind::Http(HttpErrorKind::Network)
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

impl From<reqwest_middleware::Error> for Error {
    fn from(err: reqwest_middleware::Error) -> Self {
        Error {
            source: Some(Box::new(err)),
            error_kind: ErrorKind::Http(HttpErrorKind::Network),
        }
    }
}

/// Helper function to create OAuth errors.
pub fn oauth_error(kind: OAuthErrorKind, message: &str) -> Error {
    Error {
        source: Some(message.to_string().into()),
        error_kind: ErrorKind::OAuth(kind),
    }
}
