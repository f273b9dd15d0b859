//! Validation of the provider's redirect back to us.
//!
//! Runs entirely before the token exchange; nothing here touches the network.

use serde::Deserialize;
use subtle::ConstantTimeEq;

use super::secret::{PendingAuthorization, PkceVerifier};
use crate::error::{oauth_error, Error, OAuthErrorKind};

/// Query parameters of the OAuth callback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

/// A callback that passed validation, ready for the code exchange.
#[derive(Debug)]
pub struct ValidatedCallback {
    pub code: String,
    pub code_verifier: PkceVerifier,
}

/// Validate callback parameters against the authorization issued for the session.
///
/// Checks, in order: provider error, state mismatch, missing code. A forged or
/// replayed callback is reported as a state mismatch even when it also lacks a code.
/// The pending authorization is taken by value, so it is consumed whatever the outcome.
pub fn validate(
    params: &CallbackParams,
    pending: Option<PendingAuthorization>,
) -> Result<ValidatedCallback, Error> {
    if let Some(error) = &params.error {
        return Err(oauth_error(
            OAuthErrorKind::ProviderDenied {
                error: error.clone(),
                description: params.error_description.clone(),
            },
            "Provider denied the authorization request",
        ));
    }

    let pending = pending.ok_or_else(|| {
        oauth_error(
            OAuthErrorKind::StateMismatch,
            "No pending authorization for this session",
        )
    })?;

    let returned = params.state.as_deref().unwrap_or_default();
    if !states_match(returned, pending.state.as_str()) {
        return Err(oauth_error(
            OAuthErrorKind::StateMismatch,
            "Invalid state, possible CSRF attack",
        ));
    }

    let code = match params.code.as_deref() {
        Some(code) if !code.is_empty() => code.to_string(),
        _ => {
            return Err(oauth_error(
                OAuthErrorKind::MissingAuthorizationCode,
                "Authorization code not found in callback",
            ))
        }
    };

    Ok(ValidatedCallback {
        code,
        code_verifier: pending.code_verifier,
    })
}

fn states_match(returned: &str, expected: &str) -> bool {
    !expected.is_empty() && bool::from(returned.as_bytes().ct_eq(expected.as_bytes()))
}
