//! Token summary shown to the logged in browser.

use domain::TokenRecord;
use serde::Serialize;
use utoipa::ToSchema;

/// What the session's tokens look like, without exposing them.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenInfo {
    pub has_token: bool,
    pub token_type: String,
    /// Lifetime in seconds as reported at issuance.
    pub expires_in: i64,
    pub has_refresh_token: bool,
    /// First 10 characters of the access token followed by `...`
    pub token_preview: String,
}

impl From<&TokenRecord> for TokenInfo {
    fn from(tokens: &TokenRecord) -> Self {
        let token_type = if tokens.token_type.is_empty() {
            "Bearer".to_string()
        } else {
            tokens.token_type.clone()
        };

        Self {
            has_token: true,
            token_type,
            expires_in: tokens.expires_in,
            has_refresh_token: tokens.refresh_token.is_some(),
            token_preview: tokens.preview(),
        }
    }
}
