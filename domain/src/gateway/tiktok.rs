//! TikTok resource API client.
//!
//! Calls the user info and video list endpoints with the session's access
//! token. Response bodies are returned as opaque JSON for the web layer to
//! forward unchanged.

use crate::error::{DomainErrorKind, Error, ExternalErrorKind};
use connect_auth::http::{ApiClient, ApiClientBuilder};
use log::*;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use service::config::Config;
use std::time::Duration;

/// Fields requested from the user info endpoint.
pub const USER_INFO_FIELDS: &[&str] = &[
    "open_id",
    "union_id",
    "avatar_url",
    "display_name",
    "bio_description",
    "profile_deep_link",
    "is_verified",
    "follower_count",
    "following_count",
    "likes_count",
    "video_count",
];

/// Fields requested from the video list endpoint.
pub const VIDEO_LIST_FIELDS: &[&str] = &[
    "id",
    "create_time",
    "cover_image_url",
    "share_url",
    "video_description",
    "duration",
    "height",
    "width",
    "title",
    "embed_html",
    "embed_link",
    "like_count",
    "comment_count",
    "share_count",
    "view_count",
];

#[derive(Debug, Serialize)]
struct UserInfoRequest<'a> {
    fields: &'a [&'a str],
}

#[derive(Debug, Serialize)]
struct VideoListRequest<'a> {
    max_count: u32,
    fields: &'a [&'a str],
}

/// The subset of the user info response that gets persisted.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PlatformProfile {
    pub open_id: String,
    #[serde(default)]
    pub union_id: Option<String>,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserInfoEnvelope {
    data: UserInfoData,
}

#[derive(Debug, Deserialize)]
struct UserInfoData {
    user: PlatformProfile,
}

/// Resource endpoints used by [`TikTokApiClient`].
#[derive(Debug, Clone)]
pub struct TikTokApiUrls {
    pub user_info_url: String,
    pub video_list_url: String,
}

pub struct TikTokApiClient {
    client: ApiClient,
    /// Single attempt with a short timeout; used while a login redirect waits.
    login_client: ApiClient,
    urls: TikTokApiUrls,
    video_max_count: u32,
}

impl TikTokApiClient {
    pub fn new(config: &Config) -> Result<Self, Error> {
        let client = ApiClientBuilder::new()
            .with_timeout(Duration::from_secs(config.api_timeout_secs))
            .with_max_retries(config.api_max_retries)
            .with_retry_base_delay(Duration::from_millis(config.api_retry_base_delay_ms))
            .build()?;
        let login_client = ApiClientBuilder::new()
            .with_timeout(Duration::from_secs(config.profile_fetch_timeout_secs))
            .with_max_retries(0)
            .build()?;

        Ok(Self {
            client,
            login_client,
            urls: TikTokApiUrls {
                user_info_url: config.user_info_url().to_string(),
                video_list_url: config.video_list_url().to_string(),
            },
            video_max_count: config.video_max_count,
        })
    }

    /// Raw user info response for the token's owner.
    pub async fn user_info(&self, access_token: &SecretString) -> Result<Value, Error> {
        debug!("Requesting TikTok user info");
        self.post(
            &self.client,
            &self.urls.user_info_url,
            access_token,
            &UserInfoRequest {
                fields: USER_INFO_FIELDS,
            },
        )
        .await
    }

    /// Raw video list response for the token's owner.
    pub async fn video_list(&self, access_token: &SecretString) -> Result<Value, Error> {
        debug!(
            "Requesting TikTok video list (max_count={})",
            self.video_max_count
        );
        self.post(
            &self.client,
            &self.urls.video_list_url,
            access_token,
            &VideoListRequest {
                max_count: self.video_max_count,
                fields: VIDEO_LIST_FIELDS,
            },
        )
        .await
    }

    /// Profile fields of the token's owner, taken from `data.user` of the user info response.
    ///
    /// Makes one attempt bounded by `profile_fetch_timeout_secs`, without retries.
    pub async fn fetch_profile(&self, access_token: &SecretString) -> Result<PlatformProfile, Error> {
        debug!("Fetching TikTok profile for login");
        let body = self
            .post(
                &self.login_client,
                &self.urls.user_info_url,
                access_token,
                &UserInfoRequest {
                    fields: USER_INFO_FIELDS,
                },
            )
            .await?;
        let envelope: UserInfoEnvelope = serde_json::from_value(body).map_err(|e| {
            warn!("Unexpected TikTok user info shape: {:?}", e);
            Error {
                source: Some(Box::new(e)),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Other(
                    "Invalid user info response from TikTok".to_string(),
                )),
            }
        })?;
        Ok(envelope.data.user)
    }

    async fn post<T: Serialize>(
        &self,
        client: &ApiClient,
        url: &str,
        access_token: &SecretString,
        body: &T,
    ) -> Result<Value, Error> {
        let response = client
            .post(url)
            .bearer_auth(access_token.expose_secret())
            .json(body)
            .send()
            .await
            .map_err(|e| {
                warn!("Failed to reach TikTok API at {}: {:?}", url, e);
                Error::from(e)
            })?;

        let status = response.status();
        let text = response.text().await?;
        let value = serde_json::from_str::<Value>(&text).unwrap_or(Value::String(text));

        if status.is_success() {
            Ok(value)
        } else {
            warn!("TikTok API {} returned {}: {}", url, status, value);
            Err(Error {
                source: Some(format!("TikTok API returned {status}").into()),
                error_kind: DomainErrorKind::External(ExternalErrorKind::Upstream(value)),
            })
        }
    }
}
