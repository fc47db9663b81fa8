use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use super::shared::{non_empty, parse_bool, parse_positive};
use crate::error::AppError;
use crate::scraper::{PlayerRecord, ScrapeOptions, ScrapeReport};

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ScrapeQuery {
    /// Only scrape the N most recent archives (positive integer).
    pub limit: Option<String>,
    /// Skip archives already processed: true/t/yes/y/1 or false/f/no/n/0.
    pub only_new: Option<String>,
}

impl ScrapeQuery {
    pub fn into_options(self) -> Result<ScrapeOptions, AppError> {
        let limit = non_empty(self.limit)
            .map(|v| parse_positive("limit", &v))
            .transpose()?;
        let only_new = non_empty(self.only_new)
            .map(|v| parse_bool("only_new", &v))
            .transpose()?
            .unwrap_or(false);
        Ok(ScrapeOptions { limit, only_new })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FailedArchiveResponse {
    pub year: i32,
    pub month: u32,
    pub error: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RecordResponse {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TimeControlCount {
    #[schema(example = "180+2")]
    pub time_control: String,
    pub games: u32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ScrapeDetails {
    pub limit: Option<usize>,
    pub only_new: bool,
}

/// Outcome of a scrape plus the player's record over all stored games.
#[derive(Debug, Serialize, ToSchema)]
pub struct ScrapeSummary {
    #[schema(example = "hikaru")]
    pub username: String,
    pub archives_found: usize,
    pub archives_processed: usize,
    pub archives_skipped: usize,
    pub games_inserted: u64,
    pub games_duplicate: u64,
    pub failed_archives: Vec<FailedArchiveResponse>,
    pub total_games: usize,
    pub record: RecordResponse,
    pub latest_rating: Option<i32>,
    pub latest_game_date: Option<DateTime<Utc>>,
    pub most_played_time_controls: Vec<TimeControlCount>,
    pub last_synced: Option<DateTime<Utc>>,
    pub scrape_details: ScrapeDetails,
}

impl ScrapeSummary {
    pub fn new(
        username: String,
        report: ScrapeReport,
        record: PlayerRecord,
        options: ScrapeOptions,
    ) -> Self {
        Self {
            username,
            archives_found: report.archives_found,
            archives_processed: report.archives_processed,
            archives_skipped: report.archives_skipped,
            games_inserted: report.games_inserted,
            games_duplicate: report.games_duplicate,
            failed_archives: report
                .failed_archives
                .into_iter()
                .map(|f| FailedArchiveResponse {
                    year: f.year,
                    month: f.month,
                    error: f.error,
                })
                .collect(),
            total_games: record.total_games,
            record: RecordResponse {
                wins: record.wins,
                losses: record.losses,
                draws: record.draws,
            },
            latest_rating: record.latest_rating,
            latest_game_date: record.latest_game_date,
            most_played_time_controls: record
                .most_played_time_controls
                .into_iter()
                .map(|(time_control, games)| TimeControlCount {
                    time_control,
                    games,
                })
                .collect(),
            last_synced: report.player.and_then(|p| p.last_synced),
            scrape_details: ScrapeDetails {
                limit: options.limit,
                only_new: options.only_new,
            },
        }
    }
}
