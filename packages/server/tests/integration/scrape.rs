use chess_elo_api::entity::{archive, game, player};
use sea_orm::{EntityTrait, PaginatorTrait};

use crate::common::{TestApp, Upstream, hikaru_upstream, routes};

async fn stored_games(app: &TestApp) -> u64 {
    game::Entity::find().count(&app.db).await.unwrap()
}

async fn is_processed(app: &TestApp, year: i32, month: i32) -> bool {
    archive::Entity::find_by_id(("hikaru".to_string(), year, month))
        .one(&app.db)
        .await
        .unwrap()
        .expect("archive row should exist")
        .processed
}

#[tokio::test]
async fn scrape_stores_every_archive() {
    let app = TestApp::spawn(hikaru_upstream()).await;

    let body = app.scrape_all("Hikaru").await;
    assert_eq!(body["username"], "hikaru");
    assert_eq!(body["archives_found"], 2);
    assert_eq!(body["archives_processed"], 2);
    assert_eq!(body["archives_skipped"], 0);
    assert_eq!(body["games_inserted"], 5);
    assert_eq!(body["games_duplicate"], 0);
    assert_eq!(body["failed_archives"], serde_json::json!([]));

    assert_eq!(body["total_games"], 5);
    assert_eq!(body["record"]["wins"], 3);
    assert_eq!(body["record"]["losses"], 1);
    assert_eq!(body["record"]["draws"], 1);
    assert_eq!(body["latest_rating"], 3300);
    assert!(body["latest_game_date"].as_str().unwrap().starts_with("2024-01-04"));
    assert_eq!(body["most_played_time_controls"][0]["time_control"], "180+2");
    assert_eq!(body["most_played_time_controls"][0]["games"], 4);
    assert_eq!(body["scrape_details"]["only_new"], false);
    assert!(body["scrape_details"]["limit"].is_null());

    assert_eq!(stored_games(&app).await, 5);
    let stored = player::Entity::find_by_id("hikaru".to_string())
        .one(&app.db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total_games, 5);
    assert_eq!(stored.archives_processed, 2);
    assert_eq!(stored.country.as_deref(), Some("US"));
    assert!(stored.last_synced.is_some());
}

#[tokio::test]
async fn limit_one_only_fetches_the_latest_archive() {
    let app = TestApp::spawn(hikaru_upstream()).await;

    let res = app.get(&format!("{}?limit=1", routes::scrape("hikaru"))).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["archives_found"], 2);
    assert_eq!(res.body["archives_processed"], 1);
    assert_eq!(res.body["games_inserted"], 3);
    assert_eq!(res.body["scrape_details"]["limit"], 1);

    assert_eq!(app.upstream.hits("/pub/player/hikaru/games/2024/01"), 1);
    assert_eq!(app.upstream.hits("/pub/player/hikaru/games/2023/12"), 0);
    assert!(is_processed(&app, 2024, 1).await);
    assert!(!is_processed(&app, 2023, 12).await);
}

#[tokio::test]
async fn only_new_skips_processed_archives() {
    let app = TestApp::spawn(hikaru_upstream()).await;
    app.scrape_all("hikaru").await;

    let res = app
        .get(&format!("{}?only_new=yes", routes::scrape("hikaru")))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["archives_processed"], 0);
    assert_eq!(res.body["archives_skipped"], 2);
    assert_eq!(res.body["games_inserted"], 0);
    assert_eq!(res.body["total_games"], 5);

    assert_eq!(app.upstream.hits("/pub/player/hikaru/games/2024/01"), 1);
}

#[tokio::test]
async fn rescraping_is_idempotent() {
    let app = TestApp::spawn(hikaru_upstream()).await;
    app.scrape_all("hikaru").await;

    let body = app.scrape_all("hikaru").await;
    assert_eq!(body["games_inserted"], 0);
    assert_eq!(body["games_duplicate"], 5);
    assert_eq!(stored_games(&app).await, 5);
}

#[tokio::test]
async fn failing_archive_is_reported_and_others_are_kept() {
    let upstream = hikaru_upstream().with_failing_archive("hikaru", 2024, 2);
    let app = TestApp::spawn(upstream).await;

    let body = app.scrape_all("hikaru").await;
    assert_eq!(body["archives_found"], 3);
    assert_eq!(body["archives_processed"], 2);
    assert_eq!(body["games_inserted"], 5);

    let failed = body["failed_archives"].as_array().unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0]["year"], 2024);
    assert_eq!(failed[0]["month"], 2);
    assert!(!failed[0]["error"].as_str().unwrap().is_empty());

    assert!(!is_processed(&app, 2024, 2).await);
    assert!(is_processed(&app, 2024, 1).await);
}

#[tokio::test]
async fn trailing_slash_is_accepted() {
    let app = TestApp::spawn(hikaru_upstream()).await;

    let res = app
        .get(&format!("{}/?limit=1&only_new=true", routes::scrape("hikaru")))
        .await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["archives_processed"], 1);
}

#[tokio::test]
async fn invalid_parameters_are_rejected() {
    let app = TestApp::spawn(hikaru_upstream()).await;

    for query in ["limit=0", "limit=-2", "limit=abc", "only_new=maybe"] {
        let res = app.get(&format!("{}?{query}", routes::scrape("hikaru"))).await;
        assert_eq!(res.status, 400, "{query}");
        assert_eq!(res.body["code"], "BAD_REQUEST", "{query}");
    }
    assert_eq!(app.upstream.hits("/pub/player/hikaru"), 0);
}

#[tokio::test]
async fn unknown_player_is_not_found() {
    let app = TestApp::spawn(Upstream::default()).await;

    let res = app.get(&routes::scrape("ghost")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NOT_FOUND");
    assert_eq!(stored_games(&app).await, 0);
}
