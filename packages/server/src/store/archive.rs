use std::collections::HashSet;

use chesscom::ArchiveRef;
use chrono::Utc;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QuerySelect, Set};

use crate::entity::archive;

pub struct ArchiveStore<'a, C: ConnectionTrait> {
    conn: &'a C,
}

impl<'a, C: ConnectionTrait> ArchiveStore<'a, C> {
    pub fn new(conn: &'a C) -> Self {
        Self { conn }
    }

    fn new_row(username: &str, archive: &ArchiveRef) -> archive::ActiveModel {
        archive::ActiveModel {
            player_username: Set(username.to_string()),
            year: Set(archive.year),
            month: Set(archive.month as i32),
            url: Set(archive.url.clone()),
            processed: Set(false),
            processed_at: Set(None),
            created_at: Set(Utc::now()),
        }
    }

    fn on_conflict_ignore() -> OnConflict {
        OnConflict::columns([
            archive::Column::PlayerUsername,
            archive::Column::Year,
            archive::Column::Month,
        ])
        .do_nothing()
        .to_owned()
    }

    /// Record every discovered archive. Existing rows keep their state.
    /// Returns the number of newly created rows.
    pub async fn upsert_discovered(
        &self,
        username: &str,
        archives: &[ArchiveRef],
    ) -> Result<u64, DbErr> {
        if archives.is_empty() {
            return Ok(0);
        }

        let rows = archives.iter().map(|a| Self::new_row(username, a));
        let result = archive::Entity::insert_many(rows)
            .on_conflict(Self::on_conflict_ignore())
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(inserted) => Ok(inserted),
            Err(DbErr::RecordNotInserted) => Ok(0),
            Err(e) => Err(e),
        }
    }

    /// Make sure a single archive row exists before games are attached to it.
    pub async fn ensure(&self, username: &str, archive: &ArchiveRef) -> Result<(), DbErr> {
        let result = archive::Entity::insert(Self::new_row(username, archive))
            .on_conflict(Self::on_conflict_ignore())
            .exec_without_returning(self.conn)
            .await;

        match result {
            Ok(_) | Err(DbErr::RecordNotInserted) => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// `(year, month)` pairs already marked processed for the player.
    pub async fn processed_months(&self, username: &str) -> Result<HashSet<(i32, i32)>, DbErr> {
        let months: Vec<(i32, i32)> = archive::Entity::find()
            .select_only()
            .column(archive::Column::Year)
            .column(archive::Column::Month)
            .filter(archive::Column::PlayerUsername.eq(username))
            .filter(archive::Column::Processed.eq(true))
            .into_tuple()
            .all(self.conn)
            .await?;

        Ok(months.into_iter().collect())
    }

    pub async fn mark_processed(&self, username: &str, year: i32, month: i32) -> Result<(), DbErr> {
        archive::Entity::update_many()
            .col_expr(archive::Column::Processed, Expr::value(true))
            .col_expr(archive::Column::ProcessedAt, Expr::value(Utc::now()))
            .filter(archive::Column::PlayerUsername.eq(username))
            .filter(archive::Column::Year.eq(year))
            .filter(archive::Column::Month.eq(month))
            .exec(self.conn)
            .await?;
        Ok(())
    }

    pub async fn find(
        &self,
        username: &str,
        year: i32,
        month: i32,
    ) -> Result<Option<archive::Model>, DbErr> {
        archive::Entity::find_by_id((username.to_string(), year, month))
            .one(self.conn)
            .await
    }
}
