//! Typed views over the Chess.com published-data responses.
//!
//! Every model keeps the fields it does not name in a flattened `extra` map, so
//! re-serializing a model reproduces the upstream document.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// `GET /player/{username}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Country resource URL, e.g. `https://api.chess.com/pub/country/US`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub followers: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub joined: Option<i64>,
    /// Unix seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_online: Option<i64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PlayerProfile {
    /// Two-letter country code taken from the country resource URL.
    pub fn country_code(&self) -> Option<&str> {
        self.country
            .as_deref()
            .and_then(|c| c.trim_end_matches('/').rsplit('/').next())
            .filter(|c| !c.is_empty())
    }
}

/// `GET /player/{username}/stats`: per time class ratings, kept opaque.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlayerStats {
    #[serde(flatten)]
    pub categories: Map<String, Value>,
}

/// `GET /player/{username}/games`: ongoing daily games.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CurrentGames {
    #[serde(default)]
    pub games: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `GET /player/{username}/games/archives`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveList {
    #[serde(default)]
    pub archives: Vec<String>,
}

/// `GET /titled/{title}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TitledPlayers {
    #[serde(default)]
    pub players: Vec<String>,
}

/// `GET /player/{username}/games/{YYYY}/{MM}`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArchiveGames {
    #[serde(default)]
    pub games: Vec<GameRecord>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// One finished game inside a monthly archive.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameRecord {
    #[serde(default)]
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default)]
    pub pgn: String,
    #[serde(default)]
    pub time_control: String,
    #[serde(default)]
    pub time_class: String,
    /// Unix seconds.
    #[serde(default)]
    pub end_time: i64,
    #[serde(default)]
    pub rated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fen: Option<String>,
    /// Opening resource URL, e.g. `https://www.chess.com/openings/Sicilian-Defense`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eco: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracies: Option<Accuracies>,
    #[serde(default)]
    pub white: GamePlayer,
    #[serde(default)]
    pub black: GamePlayer,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GamePlayer {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub rating: i32,
    /// win, checkmated, agreed, repetition, timeout, resigned, stalemate, ...
    #[serde(default)]
    pub result: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Accuracies {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black: Option<f64>,
}

impl GameRecord {
    /// Stable upstream identifier: the game UUID, or the last URL segment for
    /// older games that predate UUIDs.
    pub fn external_id(&self) -> Option<String> {
        if let Some(uuid) = self.uuid.as_deref().filter(|u| !u.is_empty()) {
            return Some(uuid.to_string());
        }
        self.url
            .trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|segment| !segment.is_empty() && !segment.contains(':'))
            .map(str::to_string)
    }

    /// Human readable opening name derived from the opening URL.
    pub fn opening_name(&self) -> Option<String> {
        let eco = self.eco.as_deref()?;
        if !eco.starts_with("http") {
            return None;
        }
        eco.trim_end_matches('/')
            .rsplit('/')
            .next()
            .filter(|s| !s.is_empty())
            .map(|s| s.replace('-', " "))
    }

    /// Side played by `username`, compared case-insensitively.
    pub fn side_of(&self, username: &str) -> Option<&GamePlayer> {
        if self.white.username.eq_ignore_ascii_case(username) {
            Some(&self.white)
        } else if self.black.username.eq_ignore_ascii_case(username) {
            Some(&self.black)
        } else {
            None
        }
    }
}

/// A monthly archive reference parsed from an archive URL
/// (`.../player/{username}/games/{YYYY}/{MM}`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArchiveRef {
    pub year: i32,
    pub month: u32,
    pub url: String,
}

impl ArchiveRef {
    pub fn parse(url: &str) -> Option<Self> {
        let mut segments = url.trim_end_matches('/').rsplit('/');
        let month: u32 = segments.next()?.parse().ok()?;
        let year: i32 = segments.next()?.parse().ok()?;
        if !(1..=12).contains(&month) || year < 1 {
            return None;
        }
        Some(Self {
            year,
            month,
            url: url.to_string(),
        })
    }

    /// `YYYY/MM`, the form accepted by the archive query parameter.
    pub fn label(&self) -> String {
        format!("{:04}/{:02}", self.year, self.month)
    }
}
