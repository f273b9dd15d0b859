//! Persistence of TikTok profiles seen at login.
//!
//! Storing the profile is advisory: a failure is reported as
//! [`ProfilePersistence::Failed`] and logged, and the login still succeeds.

use crate::error::{config_error, DomainErrorKind, Error, InternalErrorKind};
use crate::gateway::tiktok::{PlatformProfile, TikTokApiClient};
use crate::platform_users;
use connect_auth::oauth::token::{encryption::TokenCipher, TokenRecord};
use entity_api::platform_user::{self, ProfileUpsert};
use log::*;
use sea_orm::DatabaseConnection;
use secrecy::ExposeSecret;
use service::config::Config;

/// Outcome of the best-effort profile write that follows a login.
#[derive(Debug)]
pub enum ProfilePersistence {
    Stored(platform_users::Model),
    Failed(Error),
}

impl ProfilePersistence {
    pub fn is_stored(&self) -> bool {
        matches!(self, ProfilePersistence::Stored(_))
    }
}

/// Build the at-rest token cipher from config.
///
/// Returns `None` when no key is configured; a malformed key is a config error.
pub fn token_cipher(config: &Config) -> Result<Option<TokenCipher>, Error> {
    match config.token_encryption_key() {
        Some(key) => TokenCipher::from_hex(key)
            .map(Some)
            .map_err(|_| config_error("TOKEN_ENCRYPTION_KEY must be 64 hex characters")),
        None => {
            warn!("TOKEN_ENCRYPTION_KEY is not set, stored tokens will not be encrypted");
            Ok(None)
        }
    }
}

/// Insert or replace the stored profile and tokens for `profile.open_id`.
pub async fn upsert(
    db: &DatabaseConnection,
    cipher: Option<&TokenCipher>,
    profile: PlatformProfile,
    tokens: &TokenRecord,
) -> Result<platform_users::Model, Error> {
    let seal = |value: &str| -> Result<String, Error> {
        match cipher {
            Some(cipher) => Ok(cipher.encrypt(value)?),
            None => Ok(value.to_string()),
        }
    };

    let access_token = seal(tokens.access_token.expose_secret())?;
    let refresh_token = tokens
        .refresh_token
        .as_ref()
        .map(|t| seal(t.expose_secret()))
        .transpose()?;

    let stored = platform_user::upsert(
        db,
        ProfileUpsert {
            open_id: profile.open_id,
            union_id: profile.union_id,
            display_name: profile.display_name,
            avatar_url: profile.avatar_url,
            access_token,
            refresh_token,
            token_type: tokens.token_type.clone(),
            expires_in: tokens.expires_in,
            scopes: tokens.scopes.join(","),
        },
    )
    .await?;

    Ok(stored)
}

/// Fetch the account's profile and store it, never failing the caller.
///
/// If the user info call fails but the token response named the account, a
/// profile without display fields is stored instead.
pub async fn persist_best_effort(
    db: &DatabaseConnection,
    api: &TikTokApiClient,
    cipher: Option<&TokenCipher>,
    tokens: &TokenRecord,
) -> ProfilePersistence {
    let profile = match api.fetch_profile(&tokens.access_token).await {
        Ok(profile) => profile,
        Err(e) => match &tokens.open_id {
            Some(open_id) => {
                warn!("Could not fetch TikTok profile, storing open_id only: {}", e);
                PlatformProfile {
                    open_id: open_id.clone(),
                    union_id: None,
                    display_name: None,
                    avatar_url: None,
                }
            }
            None => {
                warn!("Could not fetch TikTok profile, nothing stored: {}", e);
                return ProfilePersistence::Failed(profile_persist_error(e));
            }
        },
    };

    match upsert(db, cipher, profile, tokens).await {
        Ok(stored) => {
            info!("Stored TikTok profile {}", stored.open_id);
            ProfilePersistence::Stored(stored)
        }
        Err(e) => {
            warn!("Failed to store TikTok profile: {}", e);
            ProfilePersistence::Failed(profile_persist_error(e))
        }
    }
}

/// All stored profiles, most recently updated first.
pub async fn find_all(db: &DatabaseConnection) -> Result<Vec<platform_users::Model>, Error> {
    Ok(platform_user::find_all(db).await?)
}

fn profile_persist_error(cause: Error) -> Error {
    Error {
        source: Some(Box::new(cause)),
        error_kind: DomainErrorKind::Internal(InternalErrorKind::ProfilePersist),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform_tokens;
    use chrono::Utc;
    use clap::Parser;
    use mockito::Server;
    use sea_orm::{ConnectOptions, ConnectionTrait, Database, Schema};
    use secrecy::SecretString;
    use serde_json::json;

    const KEY: &str = "00112233445566778899aabbccddeeff00112233445566778899aabbccddeeff";

    async fn database(with_tables: bool) -> DatabaseConnection {
        let mut options = ConnectOptions::new("sqlite::memory:");
        options.max_connections(1).sqlx_logging(false);
        let db = Database::connect(options).await.unwrap();
        if with_tables {
            let backend = db.get_database_backend();
            let schema = Schema::new(backend);
            db.execute(backend.build(&schema.create_table_from_entity(platform_users::Entity)))
                .await
                .unwrap();
            db.execute(backend.build(&schema.create_table_from_entity(platform_tokens::Entity)))
                .await
                .unwrap();
        }
        db
    }

    fn api(server: &Server) -> TikTokApiClient {
        let config = Config::parse_from(["tiktok-connect", "--api-max-retries", "0"])
            .set_user_info_url(format!("{}/v2/user/info/", server.url()));
        TikTokApiClient::new(&config).unwrap()
    }

    fn tokens(open_id: Option<&str>) -> TokenRecord {
        TokenRecord {
            access_token: SecretString::from("act.abc".to_string()),
            refresh_token: Some(SecretString::from("rft.xyz".to_string())),
            token_type: "Bearer".to_string(),
            expires_in: 86400,
            issued_at: Utc::now(),
            scopes: vec!["user.info.basic".to_string(), "video.list".to_string()],
            open_id: open_id.map(String::from),
        }
    }

    async fn user_info_returns(
        server: &mut Server,
        status: usize,
        body: serde_json::Value,
    ) -> mockito::Mock {
        server
            .mock("POST", "/v2/user/info/")
            .with_status(status)
            .with_body(body.to_string())
            .create_async()
            .await
    }

    #[tokio::test]
    async fn stores_fetched_profile_with_encrypted_tokens() {
        let mut server = Server::new_async().await;
        let _mock = user_info_returns(
            &mut server,
            200,
            json!({"data": {"user": {"open_id": "open-1", "display_name": "Alice"}}}),
        )
        .await;
        let db = database(true).await;
        let cipher = TokenCipher::from_hex(KEY).unwrap();

        let outcome = persist_best_effort(&db, &api(&server), Some(&cipher), &tokens(None)).await;

        match outcome {
            ProfilePersistence::Stored(model) => {
                assert_eq!(model.open_id, "open-1");
                assert_eq!(model.display_name.as_deref(), Some("Alice"));
            }
            ProfilePersistence::Failed(e) => panic!("expected stored profile, got {e}"),
        }

        let stored = platform_user::find_tokens(&db, "open-1").await.unwrap().unwrap();
        assert_ne!(stored.access_token, "act.abc");
        assert_eq!(cipher.decrypt(&stored.access_token).unwrap(), "act.abc");
        assert_eq!(stored.scopes, "user.info.basic,video.list");
    }

    #[tokio::test]
    async fn falls_back_to_open_id_from_token_response() {
        let mut server = Server::new_async().await;
        let _mock = user_info_returns(&mut server, 500, json!({"error": "boom"})).await;
        let db = database(true).await;

        let outcome = persist_best_effort(&db, &api(&server), None, &tokens(Some("open-2"))).await;

        assert!(outcome.is_stored());
        let stored = platform_user::find_tokens(&db, "open-2").await.unwrap().unwrap();
        assert_eq!(stored.access_token, "act.abc");
    }

    #[tokio::test]
    async fn database_failure_is_reported_not_raised() {
        let mut server = Server::new_async().await;
        let _mock = user_info_returns(
            &mut server,
            200,
            json!({"data": {"user": {"open_id": "open-1"}}}),
        )
        .await;
        let db = database(false).await;

        let outcome = persist_best_effort(&db, &api(&server), None, &tokens(None)).await;

        match outcome {
            ProfilePersistence::Failed(e) => assert_eq!(
                e.error_kind,
                DomainErrorKind::Internal(InternalErrorKind::ProfilePersist)
            ),
            ProfilePersistence::Stored(_) => panic!("expected failure without tables"),
        }
    }

    #[tokio::test]
    async fn no_profile_and_no_open_id_is_a_failure() {
        let mut server = Server::new_async().await;
        let body = json!({"error": {"code": "scope_not_authorized"}});
        let _mock = user_info_returns(&mut server, 401, body).await;
        let db = database(true).await;

        let outcome = persist_best_effort(&db, &api(&server), None, &tokens(None)).await;

        assert!(!outcome.is_stored());
        assert!(find_all(&db).await.unwrap().is_empty());
    }

    #[test]
    fn malformed_encryption_key_is_a_config_error() {
        let config = Config::parse_from(["tiktok-connect"]).set_token_encryption_key("xyz".into());
        let err = token_cipher(&config).err().unwrap();
        assert_eq!(err.error_kind, DomainErrorKind::Internal(InternalErrorKind::Config));
    }
}
