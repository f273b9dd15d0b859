//! Profile of a TikTok account that completed a login.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "platform_users")]
pub struct Model {
    /// TikTok's per-application user id.
    #[sea_orm(primary_key, auto_increment = false)]
    pub open_id: String,
    pub union_id: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTimeWithTimeZone,
    #[serde(skip_deserializing)]
    #[schema(value_type = String, format = DateTime)]
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_one = "super::platform_tokens::Entity")]
    PlatformTokens,
}

impl Related<super::platform_tokens::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PlatformTokens.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
