//! Rating history: buckets a player's stored games by period and summarises
//! the player's rating and results in each bucket.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use sea_orm::{ConnectionTrait, DbErr};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

use crate::store::{GameFilter, GameRow, GameStore};

/// Results counted as a draw for the side that reports them.
const DRAW_RESULTS: [&str; 6] = [
    "agreed",
    "repetition",
    "stalemate",
    "50move",
    "insufficient",
    "timevsinsufficient",
];

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("{0}")]
    NoData(String),
    #[error("{0}")]
    InvalidFilter(String),
    #[error(transparent)]
    Database(#[from] DbErr),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// One bucket per game.
    #[default]
    Game,
    Day,
    /// ISO 8601 week.
    Week,
    Month,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum DataFormat {
    /// List of bucket objects.
    #[default]
    Raw,
    /// Parallel arrays, one entry per bucket.
    Chart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Win,
    Loss,
    Draw,
}

impl Outcome {
    /// Classify a game from the result string reported for one side.
    pub fn from_result(result: &str) -> Self {
        if result == "win" {
            Outcome::Win
        } else if DRAW_RESULTS.contains(&result) {
            Outcome::Draw
        } else {
            Outcome::Loss
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryRequest {
    pub time_class: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub aggregation: Aggregation,
    pub data_format: DataFormat,
}

/// The game behind a per-game bucket.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct GameDetail {
    pub external_id: String,
    pub url: String,
    #[schema(example = "180+2")]
    pub time_control: String,
    pub time_class: String,
    /// Result from the player's side.
    pub result: Outcome,
    pub opponent: String,
    pub opponent_rating: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingBucket {
    /// `YYYY-MM-DD`, `YYYY-Www`, `YYYY-MM`, or the game's RFC 3339 end time.
    #[schema(example = "2024-01")]
    pub period: String,
    pub games: u32,
    /// Ratings of zero or below are ignored.
    pub min_rating: Option<i32>,
    pub avg_rating: Option<f64>,
    pub max_rating: Option<i32>,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub last_played: DateTime<Utc>,
    /// Distinct time classes played in the bucket.
    pub time_classes: Vec<String>,
    /// Set only for `game` aggregation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game: Option<GameDetail>,
}

/// The same buckets as parallel arrays.
#[derive(Debug, Clone, Default, PartialEq, Serialize, ToSchema)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub games: Vec<u32>,
    pub min: Vec<Option<i32>>,
    pub avg: Vec<Option<f64>>,
    pub max: Vec<Option<i32>>,
    pub wins: Vec<u32>,
    pub losses: Vec<u32>,
    pub draws: Vec<u32>,
}

impl ChartData {
    pub fn from_buckets(buckets: &[RatingBucket]) -> Self {
        let mut chart = ChartData::default();
        for b in buckets {
            chart.labels.push(b.period.clone());
            chart.games.push(b.games);
            chart.min.push(b.min_rating);
            chart.avg.push(b.avg_rating);
            chart.max.push(b.max_rating);
            chart.wins.push(b.wins);
            chart.losses.push(b.losses);
            chart.draws.push(b.draws);
        }
        chart
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum HistorySeries {
    Buckets(Vec<RatingBucket>),
    Chart(ChartData),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct YearCount {
    pub year: i32,
    pub games: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct RatingHistory {
    pub username: String,
    pub time_class: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub aggregation: Aggregation,
    pub data_format: DataFormat,
    /// Games matching the filters.
    pub total_games: usize,
    /// Time classes across all of the player's stored games.
    pub available_time_classes: Vec<String>,
    pub available_years: Vec<YearCount>,
    /// Lowest rating across all of the player's stored games.
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
    #[serde(flatten)]
    pub series: HistorySeries,
}

/// Half-open UTC `[start, end)` range in Unix seconds for a year or a month.
pub fn end_time_range(
    year: Option<i32>,
    month: Option<u32>,
) -> Result<Option<(i64, i64)>, HistoryError> {
    let year = match (year, month) {
        (None, None) => return Ok(None),
        (None, Some(_)) => {
            return Err(HistoryError::InvalidFilter(
                "month requires year to be set".into(),
            ));
        }
        (Some(year), _) => year,
    };
    if !(1..=9999).contains(&year) {
        return Err(HistoryError::InvalidFilter(format!(
            "Invalid year {year}: must be between 1 and 9999"
        )));
    }

    let (start, end) = match month {
        None => ((year, 1), (year + 1, 1)),
        Some(m @ 1..=11) => ((year, m), (year, m + 1)),
        Some(12) => ((year, 12), (year + 1, 1)),
        Some(m) => {
            return Err(HistoryError::InvalidFilter(format!(
                "Invalid month {m}: must be between 1 and 12"
            )));
        }
    };

    let first_of = |(y, m): (i32, u32)| {
        Utc.with_ymd_and_hms(y, m, 1, 0, 0, 0)
            .single()
            .map(|dt| dt.timestamp())
            .ok_or_else(|| HistoryError::InvalidFilter(format!("Invalid date {y:04}-{m:02}")))
    };

    Ok(Some((first_of(start)?, first_of(end)?)))
}

fn end_time_utc(end_time: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(end_time, 0).unwrap_or(DateTime::UNIX_EPOCH)
}

pub fn bucket_label(aggregation: Aggregation, at: DateTime<Utc>) -> String {
    match aggregation {
        Aggregation::Game => at.to_rfc3339_opts(SecondsFormat::Secs, true),
        Aggregation::Day => at.format("%Y-%m-%d").to_string(),
        Aggregation::Week => {
            let week = at.iso_week();
            format!("{:04}-W{:02}", week.year(), week.week())
        }
        Aggregation::Month => at.format("%Y-%m").to_string(),
    }
}

fn plays_white(row: &GameRow, username: &str) -> bool {
    row.white_username.eq_ignore_ascii_case(username)
}

/// The player's rating and result in a game they took part in.
fn player_side<'r>(row: &'r GameRow, username: &str) -> (i32, &'r str) {
    if plays_white(row, username) {
        (row.white_rating, row.white_result.as_str())
    } else {
        (row.black_rating, row.black_result.as_str())
    }
}

fn game_detail(row: &GameRow, username: &str, result: Outcome) -> GameDetail {
    let (opponent, opponent_rating) = if plays_white(row, username) {
        (&row.black_username, row.black_rating)
    } else {
        (&row.white_username, row.white_rating)
    };
    GameDetail {
        external_id: row.external_id.clone(),
        url: row.url.clone(),
        time_control: row.time_control.clone(),
        time_class: row.time_class.clone(),
        result,
        opponent: opponent.clone(),
        opponent_rating,
    }
}

struct BucketAcc {
    period: String,
    games: u32,
    rating_sum: i64,
    rated: u32,
    min: Option<i32>,
    max: Option<i32>,
    wins: u32,
    losses: u32,
    draws: u32,
    last_played: i64,
    time_classes: BTreeSet<String>,
    game: Option<GameDetail>,
}

impl BucketAcc {
    fn new(period: String) -> Self {
        Self {
            period,
            games: 0,
            rating_sum: 0,
            rated: 0,
            min: None,
            max: None,
            wins: 0,
            losses: 0,
            draws: 0,
            last_played: i64::MIN,
            time_classes: BTreeSet::new(),
            game: None,
        }
    }

    fn add(&mut self, row: &GameRow, rating: i32, outcome: Outcome) {
        self.games += 1;
        if rating > 0 {
            self.rating_sum += rating as i64;
            self.rated += 1;
            self.min = Some(self.min.map_or(rating, |m| m.min(rating)));
            self.max = Some(self.max.map_or(rating, |m| m.max(rating)));
        }
        match outcome {
            Outcome::Win => self.wins += 1,
            Outcome::Loss => self.losses += 1,
            Outcome::Draw => self.draws += 1,
        }
        self.last_played = self.last_played.max(row.end_time);
        if !row.time_class.is_empty() {
            self.time_classes.insert(row.time_class.clone());
        }
    }

    fn finish(self) -> RatingBucket {
        let avg_rating = (self.rated > 0)
            .then(|| (self.rating_sum as f64 / self.rated as f64 * 100.0).round() / 100.0);
        RatingBucket {
            period: self.period,
            games: self.games,
            min_rating: self.min,
            avg_rating,
            max_rating: self.max,
            wins: self.wins,
            losses: self.losses,
            draws: self.draws,
            last_played: end_time_utc(self.last_played),
            time_classes: self.time_classes.into_iter().collect(),
            game: self.game,
        }
    }
}

/// Bucket `rows` (ordered by end time) from `username`'s point of view.
pub fn aggregate(rows: &[GameRow], username: &str, aggregation: Aggregation) -> Vec<RatingBucket> {
    let mut buckets: Vec<BucketAcc> = Vec::new();

    for row in rows {
        let label = bucket_label(aggregation, end_time_utc(row.end_time));
        let (rating, result) = player_side(row, username);
        let outcome = Outcome::from_result(result);

        if aggregation == Aggregation::Game {
            let mut bucket = BucketAcc::new(label);
            bucket.game = Some(game_detail(row, username, outcome));
            buckets.push(bucket);
        } else if buckets.last().is_none_or(|b| b.period != label) {
            buckets.push(BucketAcc::new(label));
        }
        if let Some(bucket) = buckets.last_mut() {
            bucket.add(row, rating, outcome);
        }
    }

    buckets.into_iter().map(BucketAcc::finish).collect()
}

/// Metadata over every stored game of a player, independent of filters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overview {
    pub time_classes: Vec<String>,
    pub years: Vec<YearCount>,
    pub min_rating: Option<i32>,
    pub max_rating: Option<i32>,
}

impl Overview {
    pub fn from_rows(rows: &[GameRow], username: &str) -> Self {
        let mut time_classes = BTreeSet::new();
        let mut years: BTreeMap<i32, u32> = BTreeMap::new();
        let mut overview = Overview::default();

        for row in rows {
            if !row.time_class.is_empty() {
                time_classes.insert(row.time_class.clone());
            }
            *years.entry(end_time_utc(row.end_time).year()).or_default() += 1;
            let (rating, _) = player_side(row, username);
            if rating > 0 {
                overview.min_rating = Some(overview.min_rating.map_or(rating, |m| m.min(rating)));
                overview.max_rating = Some(overview.max_rating.map_or(rating, |m| m.max(rating)));
            }
        }

        overview.time_classes = time_classes.into_iter().collect();
        overview.years = years
            .into_iter()
            .map(|(year, games)| YearCount { year, games })
            .collect();
        overview
    }
}

/// Build the rating history for `username` from stored games.
pub async fn rating_history<C: ConnectionTrait>(
    conn: &C,
    username: &str,
    request: &HistoryRequest,
) -> Result<RatingHistory, HistoryError> {
    let range = end_time_range(request.year, request.month)?;
    let time_class = request
        .time_class
        .as_deref()
        .map(str::trim)
        .filter(|tc| !tc.is_empty())
        .map(str::to_ascii_lowercase);

    let store = GameStore::new(conn);
    let all = store
        .rows_for_participant(username, &GameFilter::default())
        .await?;
    if all.is_empty() {
        return Err(HistoryError::NoData(format!(
            "No games stored for player '{username}'"
        )));
    }

    let filter = GameFilter {
        time_class: time_class.clone(),
        end_time_range: range,
    };
    let rows = if filter.time_class.is_none() && filter.end_time_range.is_none() {
        all.clone()
    } else {
        store.rows_for_participant(username, &filter).await?
    };
    if rows.is_empty() {
        return Err(HistoryError::NoData(format!(
            "No games found for player '{username}' with the given filters"
        )));
    }

    let overview = Overview::from_rows(&all, username);
    let buckets = aggregate(&rows, username, request.aggregation);
    let series = match request.data_format {
        DataFormat::Raw => HistorySeries::Buckets(buckets),
        DataFormat::Chart => HistorySeries::Chart(ChartData::from_buckets(&buckets)),
    };

    Ok(RatingHistory {
        username: username.to_string(),
        time_class,
        year: request.year,
        month: request.month,
        aggregation: request.aggregation,
        data_format: request.data_format,
        total_games: rows.len(),
        available_time_classes: overview.time_classes,
        available_years: overview.years,
        min_rating: overview.min_rating,
        max_rating: overview.max_rating,
        series,
    })
}
