use chesscom::PlayerProfile;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, Set,
};

use crate::entity::{archive, game, player};
use crate::ratings::{RatingSnapshot, snapshot_from_json};

pub struct PlayerStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> PlayerStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert the player or refresh its profile columns. Counters and
    /// `created_at` are left untouched on conflict.
    pub async fn upsert_profile(&self, username: &str, profile: &PlayerProfile) -> Result<(), DbErr> {
        let model = player::ActiveModel {
            username: Set(username.to_string()),
            display_name: Set(profile.name.clone()),
            title: Set(profile.title.clone()),
            country: Set(profile.country_code().map(str::to_string)),
            avatar: Set(profile.avatar.clone()),
            profile_url: Set(profile.url.clone()),
            followers: Set(profile.followers),
            status: Set(profile.status.clone()),
            joined: Set(profile.joined),
            last_online: Set(profile.last_online),
            total_games: Set(0),
            archives_processed: Set(0),
            last_ratings: Set(None),
            last_synced: Set(None),
            created_at: Set(Utc::now()),
        };

        player::Entity::insert(model)
            .on_conflict(
                OnConflict::column(player::Column::Username)
                    .update_columns([
                        player::Column::DisplayName,
                        player::Column::Title,
                        player::Column::Country,
                        player::Column::Avatar,
                        player::Column::ProfileUrl,
                        player::Column::Followers,
                        player::Column::Status,
                        player::Column::Joined,
                        player::Column::LastOnline,
                    ])
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await?;

        Ok(())
    }

    pub async fn find(&self, username: &str) -> Result<Option<player::Model>, DbErr> {
        player::Entity::find_by_id(username.to_string())
            .one(self.conn)
            .await
    }

    pub async fn usernames(&self) -> Result<Vec<String>, DbErr> {
        player::Entity::find()
            .select_only()
            .column(player::Column::Username)
            .order_by_asc(player::Column::Username)
            .into_tuple()
            .all(self.conn)
            .await
    }

    /// Recount stored games and processed archives and stamp `last_synced`.
    pub async fn refresh_totals(&self, username: &str) -> Result<Option<player::Model>, DbErr> {
        let total_games = game::Entity::find()
            .filter(game::Column::PlayerUsername.eq(username))
            .count(self.conn)
            .await?;
        let archives_processed = archive::Entity::find()
            .filter(archive::Column::PlayerUsername.eq(username))
            .filter(archive::Column::Processed.eq(true))
            .count(self.conn)
            .await?;

        player::Entity::update_many()
            .col_expr(player::Column::TotalGames, Expr::value(total_games as i32))
            .col_expr(
                player::Column::ArchivesProcessed,
                Expr::value(archives_processed as i32),
            )
            .col_expr(player::Column::LastSynced, Expr::value(Utc::now()))
            .filter(player::Column::Username.eq(username))
            .exec(self.conn)
            .await?;

        self.find(username).await
    }

    pub async fn last_ratings(&self, username: &str) -> Result<RatingSnapshot, DbErr> {
        let stored = self.find(username).await?;
        Ok(snapshot_from_json(
            stored.as_ref().and_then(|p| p.last_ratings.as_ref()),
        ))
    }

    pub async fn save_ratings(&self, username: &str, ratings: &RatingSnapshot) -> Result<(), DbErr> {
        let value = serde_json::to_value(ratings).map_err(|e| DbErr::Json(e.to_string()))?;
        player::Entity::update_many()
            .col_expr(player::Column::LastRatings, Expr::value(value))
            .filter(player::Column::Username.eq(username))
            .exec(self.conn)
            .await?;
        Ok(())
    }
}
