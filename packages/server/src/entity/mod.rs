pub mod archive;
pub mod game;
pub mod player;
