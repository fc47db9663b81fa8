mod common;
mod history;
mod scrape;
