//! Persistence layer. All writes to `player`, `archive` and `game` go through
//! these stores; each one works against a connection or an open transaction.

pub mod archive;
pub mod game;
pub mod player;

pub use archive::ArchiveStore;
pub use game::{GameFilter, GameRow, GameStore, game_from_record};
pub use player::PlayerStore;
