use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chesscom::ChessComError;
use sea_orm::DbErr;
use serde::Serialize;

use crate::history::HistoryError;
use crate::scraper::ScrapeError;

/// Structured error response returned by all endpoints on failure.
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Human-readable error description.
    #[schema(example = "Player 'nosuchuser' not found")]
    pub error: String,
    /// Machine-readable error code. One of: `BAD_REQUEST`, `NOT_FOUND`, `NO_DATA`,
    /// `UPSTREAM_ERROR`, `UPSTREAM_TIMEOUT`, `INTERNAL_ERROR`.
    #[schema(example = "NOT_FOUND")]
    pub code: &'static str,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    /// Invalid path or query parameter.
    BadRequest(String),
    NotFound(String),
    /// Rating history filters matched no stored games.
    NoData(String),
    /// Upstream answered with a failure status or an unusable body.
    Upstream(String),
    UpstreamTimeout(String),
    Internal(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::BadRequest(msg) => {
                tracing::warn!("Bad request: {}", msg);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: msg,
                        code: "BAD_REQUEST",
                    },
                )
            }
            AppError::NotFound(msg) => {
                tracing::warn!("Not found: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorBody {
                        error: msg,
                        code: "NOT_FOUND",
                    },
                )
            }
            AppError::NoData(msg) => {
                tracing::warn!("No data: {}", msg);
                (
                    StatusCode::NOT_FOUND,
                    ErrorBody {
                        error: msg,
                        code: "NO_DATA",
                    },
                )
            }
            AppError::Upstream(detail) => {
                tracing::error!("Upstream error: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        error: format!("Chess.com API error: {detail}"),
                        code: "UPSTREAM_ERROR",
                    },
                )
            }
            AppError::UpstreamTimeout(detail) => {
                tracing::error!("Upstream timeout: {}", detail);
                (
                    StatusCode::BAD_GATEWAY,
                    ErrorBody {
                        error: "Chess.com API did not respond in time".into(),
                        code: "UPSTREAM_TIMEOUT",
                    },
                )
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "An unexpected error occurred".into(),
                        code: "INTERNAL_ERROR",
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<ChessComError> for AppError {
    fn from(err: ChessComError) -> Self {
        match err {
            ChessComError::NotFound(_) => AppError::NotFound(err.to_string()),
            ChessComError::Upstream { message, .. } => AppError::Upstream(message),
            ChessComError::Timeout(url) => AppError::UpstreamTimeout(url),
        }
    }
}

impl From<ScrapeError> for AppError {
    fn from(err: ScrapeError) -> Self {
        match err {
            ScrapeError::Upstream(e) => e.into(),
            ScrapeError::Database(e) => e.into(),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        match err {
            HistoryError::NoData(msg) => AppError::NoData(msg),
            HistoryError::InvalidFilter(msg) => AppError::BadRequest(msg),
            HistoryError::Database(e) => e.into(),
        }
    }
}
