//! TikTok Login Kit (OAuth v2) provider implementation.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{header::CACHE_CONTROL, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, info, warn};
use url::Url;

use crate::error::{oauth_error, Error, ErrorKind, OAuthErrorKind};
use crate::oauth::token::TokenRecord;
use crate::oauth::{
    AuthorizationRequest, PendingAuthorization, PkceVerifier, ProviderConfig, ProviderKind,
};

pub const AUTH_URL: &str = "https://www.tiktok.com/v2/auth/authorize/";
pub const TOKEN_URL: &str = "https://open.tiktokapis.com/v2/oauth/token/";

/// Successful body of the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    expires_in: i64,
    #[serde(default = "default_token_type")]
    token_type: String,
    #[serde(default)]
    scope: Option<String>,
    #[serde(default)]
    open_id: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

/// TikTok OAuth provider.
///
/// TikTok calls the client identifier `client_key` on both the authorization
/// and the token endpoint.
pub struct Provider {
    config: ProviderConfig,
    auth_url: Url,
    http_client: reqwest::Client,
}

impl Provider {
    /// Create a new TikTok OAuth provider.
    ///
    /// Fails if the authorization endpoint is not an absolute URL or the HTTP
    /// client cannot be built.
    pub fn new(config: ProviderConfig) -> Result<Self, Error> {
        let auth_url = Url::parse(&config.auth_url).map_err(|e| Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::Http(crate::error::HttpErrorKind::BuilderFailed),
        })?;
        let http_client = reqwest::Client::builder()
            .timeout(config.exchange_timeout)
            .build()?;

        Ok(Self {
            config,
            auth_url,
            http_client,
        })
    }
}

#[async_trait]
impl crate::oauth::Provider for Provider {
    fn provider(&self) -> ProviderKind {
        ProviderKind::TikTok
    }

    fn authorization_url(&self, pending: &PendingAuthorization) -> AuthorizationRequest {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_key", &self.config.client_id)
            .append_pair("scope", &self.config.scopes.join(","))
            .append_pair("response_type", "code")
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("state", pending.state.as_str())
            .append_pair("code_challenge", pending.code_challenge().as_str())
            .append_pair("code_challenge_method", "S256");

        AuthorizationRequest {
            url: url.into(),
            state: pending.state.as_str().to_string(),
        }
    }

    async fn exchange_code(
        &self,
        code: &str,
        code_verifier: &PkceVerifier,
    ) -> Result<TokenRecord, Error> {
        let form = [
            ("client_key", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.expose_secret().as_str()),
            ("code", code),
            ("grant_type", "authorization_code"),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", code_verifier.as_str()),
        ];

        debug!("Exchanging TikTok authorization code for tokens");

        let response = self
            .http_client
            .post(&self.config.token_url)
            .header(CACHE_CONTROL, "no-cache")
            .form(&form)
            .send()
            .await
            .map_err(|e| {
                warn!("TikTok token endpoint unreachable: {}", e);
                unreachable_error(e)
            })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            warn!("Failed to read TikTok token response: {}", e);
            unreachable_error(e)
        })?;

        let tokens = interpret_token_response(status, &body)?;
        info!("Successfully exchanged TikTok authorization code for tokens");
        Ok(tokens)
    }
}

fn unreachable_error(err: reqwest::Error) -> Error {
    Error {
        source: Some(Box::new(err)),
        error_kind: ErrorKind::OAuth(OAuthErrorKind::ExchangeUnreachable),
    }
}

/// Turn a raw token endpoint response into a [`TokenRecord`].
///
/// An `error` member means rejection even under HTTP 200; TikTok reports some
/// failures that way.
fn interpret_token_response(status: StatusCode, body: &str) -> Result<TokenRecord, Error> {
    let value: Value = serde_json::from_str(body).map_err(|e| {
        warn!("TikTok token endpoint returned non-JSON body (HTTP {})", status);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::ExchangeProtocolError),
        }
    })?;

    if carries_error(&value) || !status.is_success() {
        warn!("TikTok rejected the token exchange (HTTP {}): {}", status, value);
        return Err(oauth_error(
            OAuthErrorKind::ExchangeRejected(value),
            "Token endpoint returned an error",
        ));
    }

    let response: TokenResponse = serde_json::from_value(value).map_err(|e| {
        warn!("Unexpected TikTok token response shape: {}", e);
        Error {
            source: Some(Box::new(e)),
            error_kind: ErrorKind::OAuth(OAuthErrorKind::ExchangeProtocolError),
        }
    })?;

    if response.access_token.is_empty() {
        return Err(oauth_error(
            OAuthErrorKind::ExchangeProtocolError,
            "Token endpoint returned an empty access token",
        ));
    }

    Ok(TokenRecord {
        access_token: SecretString::from(response.access_token),
        refresh_token: response
            .refresh_token
            .filter(|t| !t.is_empty())
            .map(SecretString::from),
        token_type: response.token_type,
        expires_in: response.expires_in,
        issued_at: Utc::now(),
        scopes: response
            .scope
            .map(|s| {
                s.split([',', ' '])
                    .filter(|scope| !scope.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default(),
        open_id: response.open_id,
    })
}

fn carries_error(value: &Value) -> bool {
    match value.get("error") {
        None | Some(Value::Null) => false,
        Some(Value::String(code)) => !code.is_empty(),
        // Some TikTok endpoints always send an error object with code "ok".
        Some(Value::Object(error)) => error.get("code").and_then(Value::as_str) != Some("ok"),
        Some(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oauth::Provider as _;
    use mockito::{Matcher, Server};
    use serde_json::json;
    use std::time::Duration;

    fn config(token_url: String) -> ProviderConfig {
        ProviderConfig {
            client_id: "client-key-123".to_string(),
            client_secret: SecretString::from("client-secret".to_string()),
            redirect_uri: "https://example.com/auth/callback".to_string(),
            scopes: vec!["user.info.basic".to_string(), "video.list".to_string()],
            auth_url: AUTH_URL.to_string(),
            token_url,
            exchange_timeout: Duration::from_secs(2),
        }
    }

    fn oauth_kind(err: Error) -> OAuthErrorKind {
        match err.error_kind {
            ErrorKind::OAuth(kind) => kind,
            other => panic!("expected OAuth error, got {:?}", other),
        }
    }

    #[test]
    fn test_authorization_url_contains_all_parameters() {
        let provider = Provider::new(config(TOKEN_URL.to_string())).unwrap();
        let pending = PendingAuthorization::generate().unwrap();
        let request = provider.authorization_url(&pending);

        let url = Url::parse(&request.url).unwrap();
        assert_eq!(url.host_str(), Some("www.tiktok.com"));
        assert_eq!(url.path(), "/v2/auth/authorize/");

        let pairs: std::collections::HashMap<_, _> = url.query_pairs().into_owned().collect();
        assert_eq!(pairs["client_key"], "client-key-123");
        assert_eq!(pairs["scope"], "user.info.basic,video.list");
        assert_eq!(pairs["response_type"], "code");
        assert_eq!(pairs["redirect_uri"], "https://example.com/auth/callback");
        assert_eq!(pairs["state"], pending.state.as_str());
        assert_eq!(pairs["code_challenge"], pending.code_challenge().as_str());
        assert_eq!(pairs["code_challenge_method"], "S256");
        assert_eq!(request.state, pending.state.as_str());
    }

    #[test]
    fn test_fresh_pending_yields_distinct_urls() {
        let provider = Provider::new(config(TOKEN_URL.to_string())).unwrap();
        let first = provider.authorization_url(&PendingAuthorization::generate().unwrap());
        let second = provider.authorization_url(&PendingAuthorization::generate().unwrap());
        assert_ne!(first.state, second.state);
        assert_ne!(first.url, second.url);
    }

    #[test]
    fn test_invalid_auth_url_is_rejected() {
        let mut cfg = config(TOKEN_URL.to_string());
        cfg.auth_url = "not a url".to_string();
        assert!(Provider::new(cfg).is_err());
    }

    #[tokio::test]
    async fn test_exchange_code_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/v2/oauth/token/")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_header("cache-control", "no-cache")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("client_key".into(), "client-key-123".into()),
                Matcher::UrlEncoded("client_secret".into(), "client-secret".into()),
                Matcher::UrlEncoded("code".into(), "auth-code".into()),
                Matcher::UrlEncoded("grant_type".into(), "authorization_code".into()),
                Matcher::UrlEncoded(
                    "redirect_uri".into(),
                    "https://example.com/auth/callback".into(),
                ),
                Matcher::UrlEncoded("code_verifier".into(), "verifier-abc".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "access_token": "abc",
                    "refresh_token": "xyz",
                    "expires_in": 3600,
                    "token_type": "Bearer",
                    "scope": "user.info.basic,video.list",
                    "open_id": "open-1"
                })
                .to_string(),
            )
            .create_async()
            .await;

        let provider = Provider::new(config(format!("{}/v2/oauth/token/", server.url()))).unwrap();
        let verifier = PkceVerifier::from_string("verifier-abc".to_string());
        let tokens = provider.exchange_code("auth-code", &verifier).await.unwrap();

        assert_eq!(tokens.access_token.expose_secret(), "abc");
        assert_eq!(tokens.refresh_token.as_ref().unwrap().expose_secret(), "xyz");
        assert_eq!(tokens.expires_in, 3600);
        assert_eq!(tokens.token_type, "Bearer");
        assert_eq!(tokens.scopes, vec!["user.info.basic", "video.list"]);
        assert_eq!(tokens.open_id.as_deref(), Some("open-1"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_error_body_with_http_200_is_rejected() {
        let mut server = Server::new_async().await;
        let body = json!({
            "error": "invalid_grant",
            "error_description": "Authorization code is expired.",
            "log_id": "20230525..."
        });
        let _mock = server
            .mock("POST", "/v2/oauth/token/")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await;

        let provider = Provider::new(config(format!("{}/v2/oauth/token/", server.url()))).unwrap();
        let err = provider
            .exchange_code("auth-code", &PkceVerifier::from_string("v".to_string()))
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeRejected(body));
    }

    #[tokio::test]
    async fn test_unreachable_token_endpoint() {
        // Nothing listens on port 9 (discard) on test machines.
        let provider = Provider::new(config("http://127.0.0.1:9/v2/oauth/token/".to_string())).unwrap();
        let err = provider
            .exchange_code("auth-code", &PkceVerifier::from_string("v".to_string()))
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeUnreachable);
    }

    #[tokio::test]
    async fn test_stalled_token_endpoint_times_out() {
        // Accepts connections and never answers.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let mut stalled = config(format!("http://{addr}/v2/oauth/token/"));
        stalled.exchange_timeout = Duration::from_millis(200);
        let provider = Provider::new(stalled).unwrap();

        let started = std::time::Instant::now();
        let err = provider
            .exchange_code("auth-code", &PkceVerifier::from_string("v".to_string()))
            .await
            .unwrap_err();

        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeUnreachable);
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_non_json_body_is_protocol_error() {
        let err = interpret_token_response(StatusCode::BAD_GATEWAY, "<html>oops</html>").unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeProtocolError);
    }

    #[test]
    fn test_success_body_missing_fields_is_protocol_error() {
        let err = interpret_token_response(StatusCode::OK, r#"{"token_type":"Bearer"}"#).unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeProtocolError);
    }

    #[test]
    fn test_empty_access_token_is_protocol_error() {
        let err = interpret_token_response(
            StatusCode::OK,
            r#"{"access_token":"","expires_in":3600}"#,
        )
        .unwrap_err();
        assert_eq!(oauth_kind(err), OAuthErrorKind::ExchangeProtocolError);
    }

    #[test]
    fn test_error_status_with_json_body_is_rejected() {
        let err = interpret_token_response(StatusCode::UNAUTHORIZED, r#"{"message":"bad client"}"#)
            .unwrap_err();
        assert_eq!(
            oauth_kind(err),
            OAuthErrorKind::ExchangeRejected(json!({"message": "bad client"}))
        );
    }

    #[test]
    fn test_error_object_with_ok_code_is_not_an_error() {
        let tokens = interpret_token_response(
            StatusCode::OK,
            r#"{"access_token":"abc","expires_in":60,"error":{"code":"ok","message":""}}"#,
        )
        .unwrap();
        assert_eq!(tokens.access_token.expose_secret(), "abc");
        assert_eq!(tokens.token_type, "Bearer");
        assert!(tokens.refresh_token.is_none());
        assert!(tokens.scopes.is_empty());
    }
}
