use axum::Json;
use axum::extract::{Path, State};
use tracing::instrument;

use crate::error::{AppError, ErrorBody};
use crate::extractors::query::AppQuery;
use crate::history::{RatingHistory, rating_history};
use crate::models::history::RatingHistoryQuery;
use crate::models::shared::validate_username;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/player/{username}/rating-history",
    tag = "Rating History",
    operation_id = "getRatingHistory",
    summary = "Rating history from stored games",
    description = "Aggregates the player's stored games (either colour) into buckets per game, day, ISO week or month, with min/avg/max rating and results per bucket. `data_format=chart` returns the same values as parallel arrays. Run scrape-games first; no matching games yields `NO_DATA`.",
    params(
        ("username" = String, Path, description = "Chess.com username"),
        RatingHistoryQuery,
    ),
    responses(
        (status = 200, description = "Rating history", body = RatingHistory),
        (status = 400, description = "Invalid filter (BAD_REQUEST)", body = ErrorBody),
        (status = 404, description = "No stored games match (NO_DATA)", body = ErrorBody),
    ),
)]
#[instrument(skip(state, query))]
pub async fn get_rating_history(
    State(state): State<AppState>,
    Path(username): Path<String>,
    AppQuery(query): AppQuery<RatingHistoryQuery>,
) -> Result<Json<RatingHistory>, AppError> {
    let username = validate_username(&username)?;
    let request = query.into_request()?;

    let history = rating_history(&state.db, &username, &request).await?;
    Ok(Json(history))
}
