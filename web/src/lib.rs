//! HTTP surface of the TikTok connect service.

use axum::http::{header, HeaderValue, Method};
use axum::Router;
use domain::auth::{self, TikTokFlow};
use domain::gateway::tiktok::TikTokApiClient;
use domain::{platform_user, TokenCipher};
use log::*;
use sea_orm::DatabaseConnection;
use service::config::Config;
use std::sync::Arc;
use std::time::Instant;
use time::Duration;
use tower_http::cors::CorsLayer;
use tower_sessions::cookie::SameSite;
use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

pub(crate) mod controller;
pub mod error;
pub(crate) mod extractors;
pub(crate) mod middleware;
pub(crate) mod response;
pub mod router;

pub use error::{Error, Result};

/// State shared by every handler.
// Needs to implement Clone to be able to be passed into Router as State
#[derive(Clone)]
pub struct AppState {
    pub service_state: service::AppState,
    pub flow: Arc<TikTokFlow>,
    pub api: Arc<TikTokApiClient>,
    pub cipher: Option<TokenCipher>,
    pub started_at: Instant,
}

impl AppState {
    /// Build the login flow, API client and token cipher from the service config.
    ///
    /// Fails when the TikTok client credentials or the encryption key are invalid.
    pub fn new(service_state: service::AppState) -> core::result::Result<Self, domain::error::Error> {
        let config = &service_state.config;
        let flow = auth::new_flow(config)?;
        let api = TikTokApiClient::new(config)?;
        let cipher = platform_user::token_cipher(config)?;

        Ok(Self {
            service_state,
            flow: Arc::new(flow),
            api: Arc::new(api),
            cipher,
            started_at: Instant::now(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.service_state.config
    }

    pub fn db_conn_ref(&self) -> &DatabaseConnection {
        self.service_state.db_conn_ref()
    }
}

/// The full application: routes plus the cookie session and CORS layers.
pub fn app(app_state: AppState) -> Router {
    let config = app_state.config();

    // SameSite=Lax so the cookie comes back on the redirect from TikTok.
    let session_layer = SessionManagerLayer::new(MemoryStore::default())
        .with_secure(config.is_production())
        .with_same_site(SameSite::Lax)
        .with_expiry(Expiry::OnInactivity(Duration::seconds(
            config.backend_session_expiry_seconds as i64,
        )));

    let cors_layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_credentials(true)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(
            config
                .allowed_origins
                .iter()
                .filter_map(|origin| match origin.parse::<HeaderValue>() {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!("Ignoring invalid CORS origin: {}", origin);
                        None
                    }
                })
                .collect::<Vec<HeaderValue>>(),
        );

    router::define_routes(app_state)
        .layer(session_layer)
        .layer(cors_layer)
}

/// Bind to the configured interface and port and serve until shutdown.
pub async fn init_server(app_state: AppState) -> std::io::Result<()> {
    let config = app_state.config();
    let host = config.interface.as_deref().unwrap_or("0.0.0.0");
    let server_url = format!("{}:{}", host, config.port);

    info!(
        "Server starting... listening for connections on http://{} ({})",
        server_url,
        config.runtime_env()
    );

    let listener = tokio::net::TcpListener::bind(&server_url).await?;
    axum::serve(listener, app(app_state)).await
}
