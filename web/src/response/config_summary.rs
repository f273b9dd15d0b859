//! Configuration summary for checking a deployment.

use serde::Serialize;
use service::config::Config;
use utoipa::ToSchema;

/// Effective TikTok settings. Only whether a client secret is set is reported, never its value.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfigSummary {
    pub client_key: Option<String>,
    pub has_client_secret: bool,
    pub redirect_uri: String,
    pub scope: String,
    pub base_url: String,
    pub environment: String,
    pub port: u16,
    pub timestamp: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ConfigReport {
    pub status: String,
    pub message: String,
    pub config: ConfigSummary,
}

impl ConfigSummary {
    pub fn new(config: &Config, timestamp: String) -> Self {
        Self {
            client_key: config.client_key().map(String::from),
            has_client_secret: config.client_secret().is_some(),
            redirect_uri: config.redirect_uri().to_string(),
            scope: config.scope().to_string(),
            base_url: config.base_url().to_string(),
            environment: config.runtime_env().to_string(),
            port: config.port,
            timestamp,
        }
    }
}
