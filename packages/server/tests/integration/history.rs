use serde_json::Value;

use crate::common::{TestApp, hikaru_upstream, routes};

async fn scraped_app() -> TestApp {
    let app = TestApp::spawn(hikaru_upstream()).await;
    app.scrape_all("hikaru").await;
    app
}

fn history(username: &str, query: &str) -> String {
    format!("{}?{query}", routes::rating_history(username))
}

#[tokio::test]
async fn month_aggregation_gives_one_bucket_per_month() {
    let app = scraped_app().await;

    let res = app.get(&history("hikaru", "aggregation=month")).await;
    assert_eq!(res.status, 200, "{}", res.body);
    let body = res.body;
    assert_eq!(body["total_games"], 5);
    assert_eq!(body["aggregation"], "month");
    assert_eq!(body["data_format"], "raw");
    assert_eq!(body["available_time_classes"], serde_json::json!(["blitz", "bullet"]));
    assert_eq!(
        body["available_years"],
        serde_json::json!([{ "year": 2023, "games": 2 }, { "year": 2024, "games": 3 }])
    );
    assert_eq!(body["min_rating"], 3190);
    assert_eq!(body["max_rating"], 3300);

    let buckets = body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 2);
    assert_eq!(buckets[0]["period"], "2023-12");
    assert_eq!(buckets[0]["games"], 2);
    assert_eq!(buckets[0]["wins"], 1);
    assert_eq!(buckets[0]["losses"], 1);

    let jan = &buckets[1];
    assert_eq!(jan["period"], "2024-01");
    assert_eq!(jan["games"], 3);
    assert_eq!(jan["min_rating"], 3210);
    assert_eq!(jan["max_rating"], 3300);
    assert_eq!(jan["avg_rating"], 3241.67);
    assert_eq!(jan["wins"], 2);
    assert_eq!(jan["draws"], 1);
    assert_eq!(jan["time_classes"], serde_json::json!(["blitz", "bullet"]));
    assert!(jan.get("game").is_none());
    assert_eq!(buckets[0]["time_classes"], serde_json::json!(["blitz"]));
}

#[tokio::test]
async fn default_is_one_bucket_per_game() {
    let app = scraped_app().await;

    let res = app.get(&routes::rating_history("hikaru")).await;
    assert_eq!(res.status, 200);
    let buckets = res.body["buckets"].as_array().unwrap();
    assert_eq!(buckets.len(), 5);
    assert!(buckets[0]["period"].as_str().unwrap().starts_with("2023-12-02T"));
    assert!(buckets.iter().all(|b| b["games"] == 1));

    let first = &buckets[0]["game"];
    assert_eq!(first["external_id"], "dec-1");
    assert_eq!(first["url"], "https://www.chess.com/game/live/dec-1");
    assert_eq!(first["time_control"], "180+2");
    assert_eq!(first["result"], "win");
    assert_eq!(first["opponent"], "magnus");
    assert_eq!(first["opponent_rating"], 3150);

    assert_eq!(buckets[1]["game"]["result"], "loss");
    assert_eq!(buckets[1]["game"]["opponent"], "fabi");
    assert_eq!(buckets[3]["game"]["result"], "draw");
    assert_eq!(buckets[4]["game"]["time_control"], "60");
    assert_eq!(buckets[4]["game"]["time_class"], "bullet");
}

#[tokio::test]
async fn chart_format_matches_raw_values() {
    let app = scraped_app().await;

    let raw = app.get(&history("hikaru", "aggregation=day")).await.body;
    let chart = app
        .get(&history("hikaru", "aggregation=day&data_format=chart"))
        .await
        .body;

    let buckets = raw["buckets"].as_array().unwrap();
    let chart = &chart["chart"];
    assert_eq!(chart["labels"].as_array().unwrap().len(), buckets.len());
    for (i, bucket) in buckets.iter().enumerate() {
        assert_eq!(chart["labels"][i], bucket["period"]);
        assert_eq!(chart["games"][i], bucket["games"]);
        assert_eq!(chart["min"][i], bucket["min_rating"]);
        assert_eq!(chart["avg"][i], bucket["avg_rating"]);
        assert_eq!(chart["max"][i], bucket["max_rating"]);
        assert_eq!(chart["wins"][i], bucket["wins"]);
        assert_eq!(chart["losses"][i], bucket["losses"]);
        assert_eq!(chart["draws"][i], bucket["draws"]);
    }
}

#[tokio::test]
async fn filters_narrow_the_games() {
    let app = scraped_app().await;

    let bullet = app.get(&history("hikaru", "time_class=bullet")).await;
    assert_eq!(bullet.body["total_games"], 1);
    assert_eq!(bullet.body["time_class"], "bullet");

    let year = app.get(&history("hikaru", "year=2023")).await;
    assert_eq!(year.body["total_games"], 2);

    let month = app
        .get(&history("hikaru", "year=2024&month=1&aggregation=week"))
        .await;
    assert_eq!(month.body["total_games"], 3);
    assert_eq!(month.body["buckets"][0]["period"], "2024-W01");

    // Metadata always describes every stored game.
    assert_eq!(month.body["available_years"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn opponents_get_history_from_stored_games() {
    let app = scraped_app().await;

    let res = app.get(&history("Magnus", "aggregation=month")).await;
    assert_eq!(res.status, 200);
    assert_eq!(res.body["total_games"], 3);
    let buckets: &Vec<Value> = res.body["buckets"].as_array().unwrap();
    let losses: u64 = buckets.iter().map(|b| b["losses"].as_u64().unwrap()).sum();
    let draws: u64 = buckets.iter().map(|b| b["draws"].as_u64().unwrap()).sum();
    assert_eq!((losses, draws), (2, 1));
}

#[tokio::test]
async fn no_stored_games_is_no_data() {
    let app = TestApp::spawn(hikaru_upstream()).await;

    let res = app.get(&routes::rating_history("hikaru")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NO_DATA");
}

#[tokio::test]
async fn filters_matching_nothing_is_no_data() {
    let app = scraped_app().await;

    let res = app.get(&history("hikaru", "year=2024&month=2")).await;
    assert_eq!(res.status, 404);
    assert_eq!(res.body["code"], "NO_DATA");

    let res = app.get(&history("hikaru", "time_class=daily")).await;
    assert_eq!(res.status, 404);
}

#[tokio::test]
async fn invalid_filters_are_bad_requests() {
    let app = scraped_app().await;

    for query in [
        "month=2",
        "year=2024&month=13",
        "year=0",
        "year=abc",
        "aggregation=fortnight",
        "data_format=csv",
    ] {
        let res = app.get(&history("hikaru", query)).await;
        assert_eq!(res.status, 400, "{query}");
        assert_eq!(res.body["code"], "BAD_REQUEST", "{query}");
    }
}
