use std::sync::Arc;

use chesscom::ChessComApi;
use sea_orm::DatabaseConnection;

use crate::cache::ResponseCache;
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub chess: Arc<dyn ChessComApi>,
    pub cache: Arc<ResponseCache>,
    pub config: AppConfig,
}
