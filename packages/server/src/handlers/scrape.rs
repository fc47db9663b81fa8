use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::scrape::{ScrapeQuery, ScrapeSummary};
use crate::models::shared::validate_username;
use crate::scraper::ArchiveScraper;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/player/{username}/scrape-games",
    tag = "Scraping",
    operation_id = "scrapeGames",
    summary = "Import a player's archived games",
    description = "Fetches the player's monthly archives, most recent first, and stores every game not seen before. `limit` keeps only the N most recent archives; `only_new` skips archives already processed. A failing archive is reported in `failed_archives` without aborting the others.",
    params(
        ("username" = String, Path, description = "Chess.com username"),
        ScrapeQuery,
    ),
    responses(
        (status = 200, description = "Scrape summary", body = ScrapeSummary),
        (status = 400, description = "Invalid username, limit or only_new (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Player not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn scrape_games(
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppQuery(query): AppQuery<ScrapeQuery>,
) -> Result<Json<ScrapeSummary>, AppError> {
    let username = validate_username(&username)?;
    let options = query.into_options()?;

    let scraper = ArchiveScraper::new(&state.db, state.chess.as_ref());
    let report = scraper.scrape(&username, options).await?;
    let record = scraper.player_record(&username).await?;

    Ok(Json(ScrapeSummary::new(username, report, record, options)))
}
