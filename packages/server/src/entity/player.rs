use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "player")]
pub struct Model {
    /// Lower-cased Chess.com username.
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,

    pub display_name: Option<String>,
    pub title: Option<String>,
    /// Two-letter country code.
    pub country: Option<String>,
    pub avatar: Option<String>,
    pub profile_url: Option<String>,
    pub followers: Option<i64>,
    pub status: Option<String>,
    /// Unix seconds, as published upstream.
    pub joined: Option<i64>,
    pub last_online: Option<i64>,

    #[sea_orm(default_value = 0)]
    pub total_games: i32,
    #[sea_orm(default_value = 0)]
    pub archives_processed: i32,

    /// Last rating per stats category, as of the previous refresh.
    #[sea_orm(column_type = "JsonBinary", nullable)]
    pub last_ratings: Option<serde_json::Value>,

    #[sea_orm(has_many)]
    pub archives: HasMany<super::archive::Entity>,

    #[sea_orm(has_many)]
    pub games: HasMany<super::game::Entity>,

    pub last_synced: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
