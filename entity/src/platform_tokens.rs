//! Latest tokens issued for a platform user.
//!
//! Token columns hold ciphertext when a token encryption key is configured.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "platform_tokens")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub open_id: String,
    #[serde(skip_serializing)]
    pub access_token: String,
    #[serde(skip_serializing)]
    pub refresh_token: Option<String>,
    pub token_type: String,
    pub expires_in: i64,
    pub scopes: String,
    #[serde(skip_deserializing)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::platform_users::Entity",
        from = "Column::OpenId",
        to = "super::platform_users::Column::OpenId",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    PlatformUsers,
}

impl Related<super::platform_users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlatformUsers.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
