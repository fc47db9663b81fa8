pub mod history;
pub mod player;
pub mod scrape;
pub mod titled;

use std::future::Future;
use std::time::Duration;

use axum::http::{HeaderName, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use serde::Serialize;

use crate::cache::ResponseCache;
use crate::error::AppError;

const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

pub(crate) fn to_body<T: Serialize>(value: &T) -> Result<Bytes, AppError> {
    serde_json::to_vec(value)
        .map(Bytes::from)
        .map_err(|e| AppError::Internal(format!("failed to encode response: {e}")))
}

/// Answer from the response cache under `key`, running `fetch` on a miss.
pub(crate) async fn cached_json<F, Fut>(
    cache: &ResponseCache,
    key: String,
    ttl_secs: u64,
    fetch: F,
) -> Result<Response, AppError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<Bytes, AppError>>,
{
    let (body, status) = cache
        .get_or_fetch(key, Duration::from_secs(ttl_secs), fetch)
        .await?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json"),
            (X_CACHE, status.as_header_value()),
        ],
        body,
    )
        .into_response())
}
