pub mod cache;
pub mod config;
pub mod database;
pub mod entity;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod ratings;
pub mod routes;
pub mod scraper;
pub mod state;
pub mod store;

use std::time::Duration;

use axum::http::{HeaderValue, Method};
use axum::{Json, routing::get};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::normalize_path::NormalizePath;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_axum::router::OpenApiRouter;
use utoipa_scalar::{Scalar, Servable as ScalarServable};

use crate::config::CorsConfig;
use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chess Elo API",
        version = "1.0.0",
        description = "Caching proxy for the Chess.com published-data API, with local game storage and rating history"
    ),
    tags(
        (name = "Players", description = "Cached pass-through of player documents"),
        (name = "Scraping", description = "Importing archived games into local storage"),
        (name = "Rating History", description = "Aggregates over stored games"),
        (name = "Titled Players", description = "Players holding official titles"),
    ),
)]
struct ApiDoc;

fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let allow_origin = if config.allow_origins.iter().any(|o| o == "*") {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(
            config
                .allow_origins
                .iter()
                .filter_map(|o| HeaderValue::from_str(o).ok()),
        )
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(Any)
        .max_age(Duration::from_secs(config.max_age))
}

/// Build the application router.
pub fn build_router(state: AppState) -> axum::Router {
    let cors = cors_layer(&state.config.server.cors);
    let (router, api) = OpenApiRouter::with_openapi(ApiDoc::openapi())
        .nest("/api", routes::api_routes())
        .split_for_parts();

    let spec = api.clone();
    router
        .route(
            "/api-docs/openapi.json",
            get(move || std::future::ready(Json(spec.clone()))),
        )
        .with_state(state)
        .merge(Scalar::with_url("/scalar", api))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

/// The router wrapped so `/path` and `/path/` reach the same handler.
pub fn build_app(state: AppState) -> NormalizePath<axum::Router> {
    NormalizePath::trim_trailing_slash(build_router(state))
}
