use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// A finished game. Rows are append-only, keyed by the upstream game id.
#[sea_orm::model]
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "game")]
pub struct Model {
    /// Upstream UUID, or the trailing URL segment for games without one.
    #[sea_orm(primary_key, auto_increment = false)]
    pub external_id: String,

    /// Player whose archive this game was first stored from.
    pub player_username: String,
    #[sea_orm(belongs_to, from = "player_username", to = "username")]
    pub player: HasOne<super::player::Entity>,

    pub archive_year: i32,
    pub archive_month: i32,

    pub url: String,
    #[sea_orm(column_type = "Text")]
    pub pgn: String,
    pub time_control: String,
    /// bullet, blitz, rapid, daily
    pub time_class: String,
    /// Unix seconds.
    pub end_time: i64,
    pub rated: bool,

    pub white_username: String,
    pub white_rating: i32,
    pub white_result: String,
    pub black_username: String,
    pub black_rating: i32,
    pub black_result: String,

    /// Rating of `player_username` in this game.
    pub player_rating: Option<i32>,

    pub eco: Option<String>,
    pub opening: Option<String>,
    pub white_accuracy: Option<f64>,
    pub black_accuracy: Option<f64>,
    #[sea_orm(column_type = "Text", nullable)]
    pub fen: Option<String>,

    pub created_at: DateTimeUtc,
}

impl ActiveModelBehavior for ActiveModel {}
