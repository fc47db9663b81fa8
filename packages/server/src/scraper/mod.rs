//! Pulls a player's monthly archives from upstream into the local store.

pub mod refresh;

use std::collections::{HashMap, HashSet};

use chesscom::{ArchiveRef, ChessComApi, ChessComError};
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbErr, TransactionTrait};
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

use crate::entity::{game, player};
use crate::history::Outcome;
use crate::store::{ArchiveStore, GameStore, PlayerStore, game_from_record};

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error(transparent)]
    Upstream(#[from] ChessComError),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrapeOptions {
    /// Only the N most recent archives. `None` means all of them.
    pub limit: Option<usize>,
    /// Skip archives already marked processed.
    pub only_new: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArchiveOutcome {
    pub inserted: u64,
    pub duplicate: u64,
    /// Games with no usable upstream id.
    pub skipped: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedArchive {
    pub year: i32,
    pub month: u32,
    pub error: String,
}

#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub archives_found: usize,
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub games_inserted: u64,
    pub games_duplicate: u64,
    pub failed_archives: Vec<FailedArchive>,
    pub player: Option<player::Model>,
}

/// Results and activity over all games stored from a player's archives.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayerRecord {
    pub total_games: usize,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub latest_rating: Option<i32>,
    pub latest_game_date: Option<DateTime<Utc>>,
    /// `(time_control, games)`, most played first, at most five entries.
    pub most_played_time_controls: Vec<(String, u32)>,
}

impl PlayerRecord {
    pub fn from_games(username: &str, games: &[game::Model]) -> Self {
        let mut record = PlayerRecord {
            total_games: games.len(),
            ..Default::default()
        };
        let mut time_controls: HashMap<&str, u32> = HashMap::new();
        let mut latest: Option<&game::Model> = None;

        for g in games {
            let result = if g.white_username.eq_ignore_ascii_case(username) {
                &g.white_result
            } else {
                &g.black_result
            };
            match Outcome::from_result(result) {
                Outcome::Win => record.wins += 1,
                Outcome::Loss => record.losses += 1,
                Outcome::Draw => record.draws += 1,
            }
            *time_controls.entry(g.time_control.as_str()).or_default() += 1;
            let rated = g.player_rating.is_some_and(|r| r > 0);
            if rated && latest.is_none_or(|l| g.end_time > l.end_time) {
                latest = Some(g);
            }
        }

        if let Some(g) = latest {
            record.latest_rating = g.player_rating;
            record.latest_game_date = DateTime::from_timestamp(g.end_time, 0);
        }

        let mut ranked: Vec<(String, u32)> = time_controls
            .into_iter()
            .map(|(tc, n)| (tc.to_string(), n))
            .collect();
        ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        ranked.truncate(5);
        record.most_played_time_controls = ranked;

        record
    }
}

pub struct ArchiveScraper<'a> {
    db: &'a DatabaseConnection,
    api: &'a dyn ChessComApi,
}

impl<'a> ArchiveScraper<'a> {
    pub fn new(db: &'a DatabaseConnection, api: &'a dyn ChessComApi) -> Self {
        Self { db, api }
    }

    /// Fetch and store archives for `username` (already lower-cased).
    ///
    /// Profile and archive-list failures abort the scrape. A failure inside a
    /// single archive is recorded in the report and the next archive is tried.
    #[instrument(skip(self))]
    pub async fn scrape(
        &self,
        username: &str,
        options: ScrapeOptions,
    ) -> Result<ScrapeReport, ScrapeError> {
        let profile = self.api.get_profile(username).await?;
        PlayerStore::new(self.db)
            .upsert_profile(username, &profile)
            .await?;

        let urls = self.api.list_archive_urls(username).await?;
        let mut archives: Vec<ArchiveRef> = urls
            .iter()
            .filter_map(|url| {
                let parsed = ArchiveRef::parse(url);
                if parsed.is_none() {
                    warn!(url, "Ignoring unrecognised archive URL");
                }
                parsed
            })
            .collect();

        let archive_store = ArchiveStore::new(self.db);
        archive_store.upsert_discovered(username, &archives).await?;

        let mut report = ScrapeReport {
            archives_found: archives.len(),
            ..Default::default()
        };

        archives.sort_by(|a, b| (b.year, b.month).cmp(&(a.year, a.month)));
        if let Some(limit) = options.limit {
            archives.truncate(limit);
        }

        let processed = if options.only_new {
            archive_store.processed_months(username).await?
        } else {
            HashSet::new()
        };

        for archive in &archives {
            if processed.contains(&(archive.year, archive.month as i32)) {
                debug!(archive = %archive.label(), "Archive already processed, skipping");
                report.archives_skipped += 1;
                continue;
            }

            match self.process_archive(username, archive).await {
                Ok(outcome) => {
                    report.archives_processed += 1;
                    report.games_inserted += outcome.inserted;
                    report.games_duplicate += outcome.duplicate;
                }
                Err(e) => {
                    warn!(archive = %archive.label(), error = %e, "Failed to process archive");
                    report.failed_archives.push(FailedArchive {
                        year: archive.year,
                        month: archive.month,
                        error: e.to_string(),
                    });
                }
            }
        }

        report.player = PlayerStore::new(self.db).refresh_totals(username).await?;

        info!(
            archives_found = report.archives_found,
            archives_processed = report.archives_processed,
            archives_skipped = report.archives_skipped,
            games_inserted = report.games_inserted,
            games_duplicate = report.games_duplicate,
            failed = report.failed_archives.len(),
            "Scrape finished"
        );

        Ok(report)
    }

    /// Fetch one archive and store its games in a single transaction, marking
    /// the archive processed on success.
    pub async fn process_archive(
        &self,
        username: &str,
        archive: &ArchiveRef,
    ) -> Result<ArchiveOutcome, ScrapeError> {
        let games = self
            .api
            .get_archive_games(username, archive.year, archive.month)
            .await?;

        let txn = self.db.begin().await?;
        let outcome = store_archive_games(&txn, username, archive, &games.games).await?;
        txn.commit().await?;

        debug!(
            archive = %archive.label(),
            inserted = outcome.inserted,
            duplicate = outcome.duplicate,
            "Archive stored"
        );
        Ok(outcome)
    }

    pub async fn player_record(&self, username: &str) -> Result<PlayerRecord, DbErr> {
        let games = GameStore::new(self.db).owned_by(username).await?;
        Ok(PlayerRecord::from_games(username, &games))
    }
}

async fn store_archive_games<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    archive: &ArchiveRef,
    records: &[chesscom::GameRecord],
) -> Result<ArchiveOutcome, DbErr> {
    let archives = ArchiveStore::new(conn);
    archives.ensure(username, archive).await?;

    let games = GameStore::new(conn);
    let mut outcome = ArchiveOutcome::default();
    for record in records {
        let Some(model) = game_from_record(username, archive, record) else {
            warn!(url = %record.url, "Skipping game without an upstream id");
            outcome.skipped += 1;
            continue;
        };
        if games.insert_if_absent(model).await? {
            outcome.inserted += 1;
        } else {
            outcome.duplicate += 1;
        }
    }

    archives
        .mark_processed(username, archive.year, archive.month as i32)
        .await?;
    Ok(outcome)
}
