use std::sync::Arc;

use axum::extract::{OriginalUri, Path, State};
use axum::response::Response;
use chesscom::ArchiveRef;
use serde_json::json;
use tracing::{instrument, warn};

use super::{cached_json, to_body};
use crate::cache::ResponseCache;
use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::models::player::ArchiveQuery;
use crate::models::shared::validate_username;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/player/{username}",
    tag = "Players",
    operation_id = "getPlayerProfile",
    summary = "Player profile",
    description = "Proxies the Chess.com profile for a player. Responses are cached; the `X-Cache` header reports `HIT` or `MISS`.",
    params(("username" = String, Path, description = "Chess.com username")),
    responses(
        (status = 200, description = "Upstream profile document", body = serde_json::Value),
        (status = 400, description = "Invalid username (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Player not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, uri))]
pub async fn get_profile(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let username = validate_username(&username)?;
    let chess = Arc::clone(&state.chess);

    let key = ResponseCache::key(uri.path(), &[]);
    cached_json(&state.cache, key, state.config.cache.profile_ttl_secs, move || async move {
        to_body(&chess.get_profile(&username).await?)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/player/{username}/stats",
    tag = "Players",
    operation_id = "getPlayerStats",
    summary = "Player statistics",
    description = "Proxies the Chess.com rating statistics for a player, per time class.",
    params(("username" = String, Path, description = "Chess.com username")),
    responses(
        (status = 200, description = "Upstream stats document", body = serde_json::Value),
        (status = 400, description = "Invalid username (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Player not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, uri))]
pub async fn get_stats(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let username = validate_username(&username)?;
    let chess = Arc::clone(&state.chess);

    let key = ResponseCache::key(uri.path(), &[]);
    cached_json(&state.cache, key, state.config.cache.stats_ttl_secs, move || async move {
        to_body(&chess.get_stats(&username).await?)
    })
    .await
}

#[utoipa::path(
    get,
    path = "/player/{username}/games",
    tag = "Players",
    operation_id = "getCurrentGames",
    summary = "Ongoing daily games",
    description = "Proxies the list of daily games the player is currently playing.",
    params(("username" = String, Path, description = "Chess.com username")),
    responses(
        (status = 200, description = "Upstream current games document", body = serde_json::Value),
        (status = 400, description = "Invalid username (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Player not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, uri))]
pub async fn get_current_games(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
) -> Result<Response, AppError> {
    let username = validate_username(&username)?;
    let chess = Arc::clone(&state.chess);

    let key = ResponseCache::key(uri.path(), &[]);
    cached_json(
        &state.cache,
        key,
        state.config.cache.current_games_ttl_secs,
        move || async move { to_body(&chess.get_current_games(&username).await?) },
    )
    .await
}

#[utoipa::path(
    get,
    path = "/player/{username}/games/archives",
    tag = "Players",
    operation_id = "getArchiveGames",
    summary = "Games from a monthly archive",
    description = "Returns the games of one monthly archive. Without `archive`, or when the requested month is not published, the most recent archive is used. A player with no archives yields `{\"games\": []}`.",
    params(
        ("username" = String, Path, description = "Chess.com username"),
        ArchiveQuery,
    ),
    responses(
        (status = 200, description = "Upstream archive document", body = serde_json::Value),
        (status = 400, description = "Invalid username or archive (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "Player not found (NOT_FOUND)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, uri, query))]
pub async fn get_archive_games(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(username): Path<String>,
    AppQuery(query): AppQuery<ArchiveQuery>,
) -> Result<Response, AppError> {
    let username = validate_username(&username)?;
    let requested = query.selected()?;
    let chess = Arc::clone(&state.chess);

    let selector = requested.map(|(year, month)| format!("{year:04}/{month:02}"));
    let key = match &selector {
        Some(archive) => ResponseCache::key(uri.path(), &[("archive", archive.as_str())]),
        None => ResponseCache::key(uri.path(), &[]),
    };

    cached_json(&state.cache, key, state.config.cache.archive_ttl_secs, move || async move {
        let archives: Vec<ArchiveRef> = chess
            .list_archive_urls(&username)
            .await?
            .iter()
            .filter_map(|url| ArchiveRef::parse(url))
            .collect();

        let Some(latest) = archives.iter().max_by_key(|a| (a.year, a.month)) else {
            return to_body(&json!({ "games": [] }));
        };

        let target = match requested {
            Some((year, month)) => archives
                .iter()
                .find(|a| a.year == year && a.month == month)
                .unwrap_or_else(|| {
                    warn!(
                        year,
                        month,
                        fallback = %latest.label(),
                        "Requested archive not found, using the most recent one"
                    );
                    latest
                }),
            None => latest,
        };

        to_body(&chess.get_archive_games(&username, target.year, target.month).await?)
    })
    .await
}
