use std::sync::Arc;
use std::time::Duration;

use chesscom::{ArchiveRef, ChessComApi, ChessComError};
use chrono::{Datelike, Utc};
use sea_orm::{DatabaseConnection, DbErr};
use tokio::time::{Instant, interval_at};
use tracing::{debug, error, info, warn};

use super::{ArchiveScraper, ScrapeError};
use crate::config::RefreshConfig;
use crate::ratings::{ThresholdCrossing, snapshot_from_stats, threshold_crossings};
use crate::store::PlayerStore;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSummary {
    pub players: usize,
    pub games_inserted: u64,
    pub rating_crossings: usize,
    pub failed: usize,
}

/// Re-sync the current month's archive and ratings of every stored player,
/// forever.
pub async fn run_refresh_task(
    db: DatabaseConnection,
    api: Arc<dyn ChessComApi>,
    config: RefreshConfig,
) {
    let period = Duration::from_secs(config.interval_secs.max(1));

    info!(
        interval_secs = config.interval_secs,
        rating_threshold = config.rating_threshold,
        "Starting current-month refresh"
    );

    // The first sweep waits a full period; start-up should not hit upstream.
    let mut interval = interval_at(Instant::now() + period, period);

    loop {
        interval.tick().await;

        let now = Utc::now();
        match refresh_month(&db, api.as_ref(), now.year(), now.month(), config.rating_threshold)
            .await
        {
            Ok(summary) => info!(
                players = summary.players,
                games_inserted = summary.games_inserted,
                rating_crossings = summary.rating_crossings,
                failed = summary.failed,
                "Current-month refresh finished"
            ),
            Err(e) => error!(error = %e, "Current-month refresh failed"),
        }
    }
}

/// Process the `year`/`month` archive of every stored player and compare
/// their ratings with the previous snapshot. A player whose refresh fails is
/// logged and skipped.
pub async fn refresh_month(
    db: &DatabaseConnection,
    api: &dyn ChessComApi,
    year: i32,
    month: u32,
    rating_threshold: i32,
) -> Result<RefreshSummary, DbErr> {
    let usernames = PlayerStore::new(db).usernames().await?;
    let scraper = ArchiveScraper::new(db, api);
    let mut summary = RefreshSummary {
        players: usernames.len(),
        ..Default::default()
    };

    for username in usernames {
        match refresh_player(db, api, &scraper, &username, year, month, rating_threshold).await {
            Ok((inserted, crossings)) => {
                summary.games_inserted += inserted;
                summary.rating_crossings += crossings.len();
            }
            Err(e) => {
                warn!(username, year, month, error = %e, "Refresh failed for player");
                summary.failed += 1;
            }
        }
    }

    Ok(summary)
}

async fn refresh_player(
    db: &DatabaseConnection,
    api: &dyn ChessComApi,
    scraper: &ArchiveScraper<'_>,
    username: &str,
    year: i32,
    month: u32,
    rating_threshold: i32,
) -> Result<(u64, Vec<ThresholdCrossing>), ScrapeError> {
    let players = PlayerStore::new(db);
    let archive = ArchiveRef {
        year,
        month,
        url: api.archive_url(username, year, month),
    };

    let inserted = match scraper.process_archive(username, &archive).await {
        Ok(outcome) => {
            players.refresh_totals(username).await?;
            outcome.inserted
        }
        Err(ScrapeError::Upstream(ChessComError::NotFound(_))) => {
            debug!(username, archive = %archive.label(), "No archive for this month yet");
            0
        }
        Err(e) => return Err(e),
    };

    let crossings = check_ratings(&players, api, username, rating_threshold).await?;
    Ok((inserted, crossings))
}

/// Compare current ratings with the stored snapshot, log every threshold
/// crossed and store the new snapshot.
pub async fn check_ratings(
    players: &PlayerStore<'_, DatabaseConnection>,
    api: &dyn ChessComApi,
    username: &str,
    rating_threshold: i32,
) -> Result<Vec<ThresholdCrossing>, ScrapeError> {
    let current = snapshot_from_stats(&api.get_stats(username).await?);
    if current.is_empty() {
        debug!(username, "No ratings published");
        return Ok(Vec::new());
    }

    let last = players.last_ratings(username).await?;
    if last == current {
        return Ok(Vec::new());
    }

    let crossings = threshold_crossings(&last, &current, rating_threshold);
    for c in &crossings {
        info!(
            username,
            category = %c.category,
            last_rating = c.last_rating,
            current_rating = c.current_rating,
            last_threshold = c.last_threshold,
            current_threshold = c.current_threshold,
            direction = %c.direction,
            "Rating threshold crossed"
        );
    }

    players.save_ratings(username, &current).await?;
    Ok(crossings)
}
