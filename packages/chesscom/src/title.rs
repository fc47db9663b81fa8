use std::fmt;
use std::str::FromStr;

/// Official chess titles accepted by the titled-players endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChessTitle {
    Gm,
    Wgm,
    Im,
    Wim,
    Fm,
    Wfm,
    Nm,
    Wnm,
    Cm,
    Wcm,
}

impl ChessTitle {
    pub const ALL: [ChessTitle; 10] = [
        Self::Gm,
        Self::Wgm,
        Self::Im,
        Self::Wim,
        Self::Fm,
        Self::Wfm,
        Self::Nm,
        Self::Wnm,
        Self::Cm,
        Self::Wcm,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gm => "GM",
            Self::Wgm => "WGM",
            Self::Im => "IM",
            Self::Wim => "WIM",
            Self::Fm => "FM",
            Self::Wfm => "WFM",
            Self::Nm => "NM",
            Self::Wnm => "WNM",
            Self::Cm => "CM",
            Self::Wcm => "WCM",
        }
    }

    /// Comma-separated list used in validation messages.
    pub fn valid_list() -> String {
        Self::ALL
            .iter()
            .map(ChessTitle::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

impl fmt::Display for ChessTitle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChessTitle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == upper)
            .ok_or_else(|| {
                format!(
                    "Invalid title '{s}'. Valid titles are: {}",
                    Self::valid_list()
                )
            })
    }
}
