pub mod history;
pub mod player;
pub mod scrape;
pub mod shared;
