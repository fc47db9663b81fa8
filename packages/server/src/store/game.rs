use chesscom::{ArchiveRef, GameRecord};
use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::sea_query::{Func, OnConflict};
use sea_orm::*;

use crate::entity::game;

/// Columns the rating history needs from a stored game.
#[derive(Debug, Clone, PartialEq, FromQueryResult)]
pub struct GameRow {
    pub external_id: String,
    pub url: String,
    pub end_time: i64,
    pub time_control: String,
    pub time_class: String,
    pub white_username: String,
    pub white_rating: i32,
    pub white_result: String,
    pub black_username: String,
    pub black_rating: i32,
    pub black_result: String,
}

#[derive(Debug, Clone, Default)]
pub struct GameFilter {
    pub time_class: Option<String>,
    /// Half-open `[start, end)` range of end times, Unix seconds.
    pub end_time_range: Option<(i64, i64)>,
}

/// Build a row for a game found in `owner`'s archive. Returns `None` when the
/// game has no usable upstream id.
pub fn game_from_record(
    owner: &str,
    archive: &ArchiveRef,
    record: &GameRecord,
) -> Option<game::ActiveModel> {
    let external_id = record.external_id()?;
    let accuracies = record.accuracies.unwrap_or_default();

    Some(game::ActiveModel {
        external_id: Set(external_id),
        player_username: Set(owner.to_string()),
        archive_year: Set(archive.year),
        archive_month: Set(archive.month as i32),
        url: Set(record.url.clone()),
        pgn: Set(record.pgn.clone()),
        time_control: Set(record.time_control.clone()),
        time_class: Set(record.time_class.clone()),
        end_time: Set(record.end_time),
        rated: Set(record.rated),
        white_username: Set(record.white.username.clone()),
        white_rating: Set(record.white.rating),
        white_result: Set(record.white.result.clone()),
        black_username: Set(record.black.username.clone()),
        black_rating: Set(record.black.rating),
        black_result: Set(record.black.result.clone()),
        player_rating: Set(record.side_of(owner).map(|p| p.rating)),
        eco: Set(record.eco.clone()),
        opening: Set(record.opening_name()),
        white_accuracy: Set(accuracies.white),
        black_accuracy: Set(accuracies.black),
        fen: Set(record.fen.clone()),
        created_at: Set(Utc::now()),
    })
}

pub struct GameStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> GameStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    /// Insert unless a game with the same external id is already stored.
    /// Returns whether a row was written.
    pub async fn insert_if_absent(&self, model: game::ActiveModel) -> Result<bool, DbErr> {
        let result = game::Entity::insert(model)
            .on_conflict(
                OnConflict::column(game::Column::ExternalId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(rows) => Ok(rows > 0),
            Err(DbErr::RecordNotInserted) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Games stored from `owner`'s archives, newest first.
    pub async fn owned_by(&self, owner: &str) -> Result<Vec<game::Model>, DbErr> {
        game::Entity::find()
            .filter(game::Column::PlayerUsername.eq(owner))
            .order_by_desc(game::Column::EndTime)
            .all(self.conn)
            .await
    }

    fn participant_condition(username: &str) -> Condition {
        let username = username.to_ascii_lowercase();
        Condition::any()
            .add(Expr::expr(Func::lower(Expr::col(game::Column::WhiteUsername))).eq(username.clone()))
            .add(Expr::expr(Func::lower(Expr::col(game::Column::BlackUsername))).eq(username))
    }

    /// Every stored game `username` played in on either side, regardless of
    /// whose archive it came from, oldest first.
    pub async fn rows_for_participant(
        &self,
        username: &str,
        filter: &GameFilter,
    ) -> Result<Vec<GameRow>, DbErr> {
        let mut query = game::Entity::find()
            .select_only()
            .columns([
                game::Column::ExternalId,
                game::Column::Url,
                game::Column::EndTime,
                game::Column::TimeControl,
                game::Column::TimeClass,
                game::Column::WhiteUsername,
                game::Column::WhiteRating,
                game::Column::WhiteResult,
                game::Column::BlackUsername,
                game::Column::BlackRating,
                game::Column::BlackResult,
            ])
            .filter(Self::participant_condition(username));

        if let Some(time_class) = &filter.time_class {
            query = query.filter(game::Column::TimeClass.eq(time_class.as_str()));
        }
        if let Some((start, end)) = filter.end_time_range {
            query = query
                .filter(game::Column::EndTime.gte(start))
                .filter(game::Column::EndTime.lt(end));
        }

        query
            .order_by_asc(game::Column::EndTime)
            .into_model::<GameRow>()
            .all(self.conn)
            .await
    }
}
