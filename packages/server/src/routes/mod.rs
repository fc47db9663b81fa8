use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .merge(player_routes())
        .routes(routes!(handlers::titled::list_titled_players))
}

fn player_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::player::get_profile))
        .routes(routes!(handlers::player::get_stats))
        .routes(routes!(handlers::player::get_current_games))
        .routes(routes!(handlers::player::get_archive_games))
        .routes(routes!(handlers::scrape::scrape_games))
        .routes(routes!(handlers::history::get_rating_history))
}
