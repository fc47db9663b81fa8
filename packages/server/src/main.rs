use std::sync::Arc;

use anyhow::Context;
use axum::ServiceExt;
use axum::extract::Request;
use chess_elo_api::cache::ResponseCache;
use chess_elo_api::config::AppConfig;
use chess_elo_api::database::init_db;
use chess_elo_api::scraper::refresh::run_refresh_task;
use chess_elo_api::state::AppState;
use chesscom::{ChessComApi, HttpChessClient};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load().context("Failed to load configuration")?;

    let db = init_db(&config.database)
        .await
        .context("Failed to initialize database")?;

    let chess: Arc<dyn ChessComApi> = Arc::new(
        HttpChessClient::new(&config.chesscom).context("Failed to build Chess.com client")?,
    );

    if config.refresh.enabled {
        tokio::spawn(run_refresh_task(
            db.clone(),
            Arc::clone(&chess),
            config.refresh.clone(),
        ));
    }

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        db,
        chess,
        cache: Arc::new(ResponseCache::new(config.cache.enabled)),
        config,
    };

    let app = chess_elo_api::build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, ServiceExt::<Request>::into_make_service(app)).await?;

    Ok(())
}
