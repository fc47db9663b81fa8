use std::sync::Arc;

use axum::extract::{OriginalUri, Path, State};
use axum::response::Response;
use chesscom::ChessTitle;
use tracing::instrument;

use super::{cached_json, to_body};
use crate::cache::ResponseCache;
use crate::error::{AppError, ErrorBody};
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/titled/{title}",
    tag = "Titled Players",
    operation_id = "listTitledPlayers",
    summary = "Usernames holding a title",
    description = "Proxies the list of players holding an official title. Valid titles: GM, WGM, IM, WIM, FM, WFM, NM, WNM, CM, WCM (any case).",
    params(("title" = String, Path, description = "Title abbreviation", example = "GM")),
    responses(
        (status = 200, description = "`{\"players\": [...]}`", body = serde_json::Value),
        (status = 400, description = "Unknown title (BAD_REQUEST)", body = ErrorBody),
        (status = 502, description = "Upstream failure (UPSTREAM_ERROR, UPSTREAM_TIMEOUT)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, uri))]
pub async fn list_titled_players(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Path(title): Path<String>,
) -> Result<Response, AppError> {
    let title: ChessTitle = title.parse().map_err(AppError::BadRequest)?;
    let chess = Arc::clone(&state.chess);

    let key = ResponseCache::key(uri.path(), &[]);
    cached_json(&state.cache, key, state.config.cache.titled_ttl_secs, move || async move {
        to_body(&chess.list_titled_players(title).await?)
    })
    .await
}
