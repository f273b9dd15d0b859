//! OAuth token types.

use chrono::{DateTime, Duration, Utc};
use secrecy::{ExposeSecret, SecretString};

/// Number of characters shown by [`TokenRecord::preview`].
const PREVIEW_CHARS: usize = 10;

/// Tokens issued by a successful code exchange, held for one login session.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    /// Bearer credential for API requests. Never empty.
    pub access_token: SecretString,
    /// Refresh token, if the provider issued one.
    pub refresh_token: Option<SecretString>,
    /// Token type (usually "Bearer").
    pub token_type: String,
    /// Lifetime of the access token in seconds, as reported by the provider.
    pub expires_in: i64,
    /// When we received the token.
    pub issued_at: DateTime<Utc>,
    /// Granted scopes.
    pub scopes: Vec<String>,
    /// Provider's identifier for the authorizing user, when returned with the token.
    pub open_id: Option<String>,
}

impl TokenRecord {
    /// When the access token expires.
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.issued_at + Duration::seconds(self.expires_in)
    }

    /// Check if the access token is past its expiry.
    ///
    /// Expiry is informational only; tokens are not refreshed automatically.
    pub fn is_expired(&self) -> bool {
        self.expires_at() <= Utc::now()
    }

    /// First characters of the access token followed by an ellipsis, safe for display.
    pub fn preview(&self) -> String {
        let head: String = self
            .access_token
            .expose_secret()
            .chars()
            .take(PREVIEW_CHARS)
            .collect();
        format!("{head}...")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(issued_at: DateTime<Utc>, expires_in: i64) -> TokenRecord {
        TokenRecord {
            access_token: SecretString::from("act.1234567890abcdef".to_string()),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            expires_in,
            issued_at,
            scopes: vec![],
            open_id: None,
        }
    }

    #[test]
    fn test_token_not_expired() {
        assert!(!record(Utc::now(), 3600).is_expired());
    }

    #[test]
    fn test_token_expired() {
        let tokens = record(Utc::now() - Duration::hours(2), 3600);
        assert!(tokens.is_expired());
        assert!(tokens.expires_at() < Utc::now());
    }

    #[test]
    fn test_expires_at_is_issue_time_plus_lifetime() {
        let issued_at = Utc::now();
        assert_eq!(record(issued_at, 86400).expires_at(), issued_at + Duration::days(1));
    }

    #[test]
    fn test_preview_shows_ten_characters() {
        assert_eq!(record(Utc::now(), 3600).preview(), "act.123456...");
    }

    #[test]
    fn test_preview_of_short_token() {
        let mut tokens = record(Utc::now(), 3600);
        tokens.access_token = SecretString::from("abc".to_string());
        assert_eq!(tokens.preview(), "abc...");
    }
}
