pub mod client;
pub mod config;
pub mod error;
pub mod models;
pub mod title;

pub use client::{ChessComApi, HttpChessClient};
pub use config::ChessComConfig;
pub use error::ChessComError;
pub use models::{
    ArchiveGames, ArchiveList, ArchiveRef, CurrentGames, GamePlayer, GameRecord, PlayerProfile,
    PlayerStats, TitledPlayers,
};
pub use title::ChessTitle;
