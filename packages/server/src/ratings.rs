//! Rating snapshots taken from the stats endpoint, and the threshold
//! crossings between two snapshots.

use std::collections::BTreeMap;
use std::fmt;

use chesscom::PlayerStats;
use serde_json::Value;

/// Stats categories a snapshot keeps.
pub const RATED_CATEGORIES: [&str; 4] = ["chess_daily", "chess_rapid", "chess_blitz", "chess_bullet"];

/// Last rating per stats category, e.g. `chess_blitz -> 3250`.
pub type RatingSnapshot = BTreeMap<String, i32>;

pub fn snapshot_from_stats(stats: &PlayerStats) -> RatingSnapshot {
    RATED_CATEGORIES
        .iter()
        .filter_map(|category| {
            let rating = stats
                .categories
                .get(*category)?
                .get("last")?
                .get("rating")?
                .as_i64()?;
            Some((category.to_string(), i32::try_from(rating).ok()?))
        })
        .collect()
}

/// Read a stored snapshot. Anything unreadable counts as no snapshot.
pub fn snapshot_from_json(value: Option<&Value>) -> RatingSnapshot {
    value
        .and_then(|v| serde_json::from_value(v.clone()).ok())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Increased,
    Decreased,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Increased => write!(f, "increased"),
            Direction::Decreased => write!(f, "decreased"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThresholdCrossing {
    pub category: String,
    pub last_rating: i32,
    pub current_rating: i32,
    pub last_threshold: i32,
    pub current_threshold: i32,
    pub direction: Direction,
}

/// Categories whose rating moved into a different multiple of `interval`.
///
/// A category needs a positive rating in both snapshots to be compared.
pub fn threshold_crossings(
    last: &RatingSnapshot,
    current: &RatingSnapshot,
    interval: i32,
) -> Vec<ThresholdCrossing> {
    let interval = interval.max(1);

    current
        .iter()
        .filter_map(|(category, &current_rating)| {
            let last_rating = last.get(category).copied().unwrap_or(0);
            if current_rating <= 0 || last_rating <= 0 {
                return None;
            }

            let last_threshold = last_rating.div_euclid(interval) * interval;
            let current_threshold = current_rating.div_euclid(interval) * interval;
            if last_threshold == current_threshold {
                return None;
            }

            Some(ThresholdCrossing {
                category: category.clone(),
                last_rating,
                current_rating,
                last_threshold,
                current_threshold,
                direction: if current_threshold > last_threshold {
                    Direction::Increased
                } else {
                    Direction::Decreased
                },
            })
        })
        .collect()
}
