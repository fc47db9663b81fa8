use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A calendar month of a player's games as published upstream.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "archive")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub player_username: String,
    #[sea_orm(primary_key)]
    pub year: i32,
    #[sea_orm(primary_key)]
    pub month: i32,

    #[sea_orm(belongs_to, from = "player_username", to = "username")]
    pub player: HasOne<super::player::Entity>,

    pub url: String,

    #[sea_orm(default_value = false)]
    pub processed: bool,
    pub processed_at: Option<DateTimeUtc>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
