use super::error::{EntityApiErrorKind, Error};
use chrono::{DateTime, Utc};
use entity::platform_tokens;
use entity::platform_users::{ActiveModel, Column, Entity, Model};
use log::debug;
use sea_orm::{
    entity::prelude::*, sea_query::OnConflict, ActiveValue::Set, ConnectionTrait, QueryOrder,
    TransactionTrait,
};

/// Everything stored for one TikTok account after a login.
///
/// Token fields are written as given; callers encrypt them first when a key is configured.
#[derive(Clone, Debug)]
pub struct ProfileUpsert {
    pub open_id: String,
    pub union_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
    pub scopes: String,
}

/// Inserts or replaces the profile and token rows keyed by `open_id`.
///
/// Both rows are written in one transaction. On conflict every field is
/// replaced except `created_at`.
pub async fn upsert(db: &impl TransactionTrait, profile: ProfileUpsert) -> Result<Model, Error> {
    upsert_at(db, profile, Utc::now()).await
}

pub(crate) async fn upsert_at(
    db: &impl TransactionTrait,
    profile: ProfileUpsert,
    now: DateTime<Utc>,
) -> Result<Model, Error> {
    if profile.open_id.is_empty() {
        return Err(Error {
            source: None,
            error_kind: EntityApiErrorKind::ValidationError,
        });
    }

    debug!("Upserting platform user: {}", profile.open_id);

    let txn = db.begin().await?;

    let user = ActiveModel {
        open_id: Set(profile.open_id.clone()),
        union_id: Set(profile.union_id),
        display_name: Set(profile.display_name),
        avatar_url: Set(profile.avatar_url),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    Entity::insert(user)
        .on_conflict(
            OnConflict::column(Column::OpenId)
                .update_columns([
                    Column::UnionId,
                    Column::DisplayName,
                    Column::AvatarUrl,
                    Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let tokens = platform_tokens::ActiveModel {
        open_id: Set(profile.open_id.clone()),
        access_token: Set(profile.access_token),
        refresh_token: Set(profile.refresh_token),
        token_type: Set(profile.token_type),
        expires_in: Set(profile.expires_in),
        scopes: Set(profile.scopes),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
    };

    platform_tokens::Entity::insert(tokens)
        .on_conflict(
            OnConflict::column(platform_tokens::Column::OpenId)
                .update_columns([
                    platform_tokens::Column::AccessToken,
                    platform_tokens::Column::RefreshToken,
                    platform_tokens::Column::TokenType,
                    platform_tokens::Column::ExpiresIn,
                    platform_tokens::Column::Scopes,
                    platform_tokens::Column::UpdatedAt,
                ])
                .to_owned(),
        )
        .exec_without_returning(&txn)
        .await?;

    let stored = Entity::find_by_id(profile.open_id)
        .one(&txn)
        .await?
        .ok_or(Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        })?;

    txn.commit().await?;

    Ok(stored)
}

/// All stored profiles, most recently updated first.
pub async fn find_all(db: &impl ConnectionTrait) -> Result<Vec<Model>, Error> {
    Ok(Entity::find()
        .order_by_desc(Column::UpdatedAt)
        .all(db)
        .await?)
}

/// Stored tokens for a profile, still in their at-rest form.
pub async fn find_tokens(
    db: &impl ConnectionTrait,
    open_id: &str,
) -> Result<Option<platform_tokens::Model>, Error> {
    Ok(platform_tokens::Entity::find_by_id(open_id.to_string())
        .one(db)
        .await?)
}
