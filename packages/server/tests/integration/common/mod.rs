use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::extract::{Request, State};
use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::{Json, Router, ServiceExt};
use chesscom::ChessComConfig;
use reqwest::Client;
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};
use tempfile::TempDir;

use chess_elo_api::cache::ResponseCache;
use chess_elo_api::config::{
    AppConfig, CacheConfig, CorsConfig, DatabaseConfig, RefreshConfig, ServerConfig,
};
use chess_elo_api::state::AppState;

pub mod routes {
    pub fn profile(username: &str) -> String {
        format!("/api/player/{username}")
    }

    pub fn stats(username: &str) -> String {
        format!("/api/player/{username}/stats")
    }

    pub fn current_games(username: &str) -> String {
        format!("/api/player/{username}/games")
    }

    pub fn archive_games(username: &str) -> String {
        format!("/api/player/{username}/games/archives")
    }

    pub fn scrape(username: &str) -> String {
        format!("/api/player/{username}/scrape-games")
    }

    pub fn rating_history(username: &str) -> String {
        format!("/api/player/{username}/rating-history")
    }

    pub fn titled(title: &str) -> String {
        format!("/api/titled/{title}")
    }
}

enum ArchiveFixture {
    Games(Vec<Value>),
    Failing,
}

/// In-process stand-in for the Chess.com published-data API.
#[derive(Default)]
pub struct Upstream {
    players: HashMap<String, BTreeMap<(i32, u32), ArchiveFixture>>,
    titled: HashMap<String, Vec<String>>,
    hits: Mutex<HashMap<String, usize>>,
}

impl Upstream {
    pub fn with_player(mut self, username: &str) -> Self {
        self.players.entry(username.to_lowercase()).or_default();
        self
    }

    pub fn with_archive(mut self, username: &str, year: i32, month: u32, games: Vec<Value>) -> Self {
        self.players
            .entry(username.to_lowercase())
            .or_default()
            .insert((year, month), ArchiveFixture::Games(games));
        self
    }

    pub fn with_failing_archive(mut self, username: &str, year: i32, month: u32) -> Self {
        self.players
            .entry(username.to_lowercase())
            .or_default()
            .insert((year, month), ArchiveFixture::Failing);
        self
    }

    pub fn with_titled(mut self, title: &str, players: &[&str]) -> Self {
        self.titled.insert(
            title.to_string(),
            players.iter().map(|p| p.to_string()).collect(),
        );
        self
    }

    /// Number of upstream requests made for `path` (e.g. `/pub/player/hikaru`).
    pub fn hits(&self, path: &str) -> usize {
        self.hits.lock().unwrap().get(path).copied().unwrap_or(0)
    }

    fn record(&self, path: &str) {
        *self.hits.lock().unwrap().entry(path.to_string()).or_default() += 1;
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Json(json!({ "code": 0, "message": "not found" }))).into_response()
}

async fn serve_upstream(State(upstream): State<Arc<Upstream>>, uri: Uri) -> Response {
    upstream.record(uri.path());

    let path = uri.path().trim_start_matches("/pub/");
    let segments: Vec<&str> = path.split('/').collect();

    match segments.as_slice() {
        ["titled", title] => match upstream.titled.get(*title) {
            Some(players) => Json(json!({ "players": players })).into_response(),
            None => not_found(),
        },
        ["player", name, rest @ ..] => {
            let Some(archives) = upstream.players.get(*name) else {
                return not_found();
            };
            match rest {
                [] => Json(json!({
                    "username": name,
                    "player_id": 15448422,
                    "url": format!("https://www.chess.com/member/{name}"),
                    "followers": 1200,
                    "country": "https://api.chess.com/pub/country/US",
                    "status": "premium",
                    "joined": 1389043258,
                    "last_online": 1704067200,
                    "verified": true
                }))
                .into_response(),
                ["stats"] => Json(json!({
                    "chess_blitz": { "last": { "rating": 3250, "date": 1704067200, "rd": 30 } }
                }))
                .into_response(),
                ["games"] => Json(json!({ "games": [] })).into_response(),
                ["games", "archives"] => {
                    let urls: Vec<String> = archives
                        .keys()
                        .map(|(y, m)| {
                            format!("https://api.chess.com/pub/player/{name}/games/{y:04}/{m:02}")
                        })
                        .collect();
                    Json(json!({ "archives": urls })).into_response()
                }
                ["games", year, month] => {
                    let key: (i32, u32) = (year.parse().unwrap_or(0), month.parse().unwrap_or(0));
                    match archives.get(&key) {
                        Some(ArchiveFixture::Games(games)) => {
                            Json(json!({ "games": games })).into_response()
                        }
                        Some(ArchiveFixture::Failing) => {
                            StatusCode::INTERNAL_SERVER_ERROR.into_response()
                        }
                        None => not_found(),
                    }
                }
                _ => not_found(),
            }
        }
        _ => not_found(),
    }
}

/// A finished blitz game as published in a monthly archive.
pub fn game(
    id: &str,
    end_time: i64,
    white: (&str, i32, &str),
    black: (&str, i32, &str),
) -> Value {
    timed_game(id, end_time, "blitz", white, black)
}

pub fn timed_game(
    id: &str,
    end_time: i64,
    time_class: &str,
    white: (&str, i32, &str),
    black: (&str, i32, &str),
) -> Value {
    json!({
        "url": format!("https://www.chess.com/game/live/{id}"),
        "uuid": id,
        "pgn": "[Event \"Live Chess\"]\n1. e4 e5 2. Nf3 *",
        "time_control": if time_class == "bullet" { "60" } else { "180+2" },
        "time_class": time_class,
        "end_time": end_time,
        "rated": true,
        "rules": "chess",
        "eco": "https://www.chess.com/openings/Kings-Pawn-Opening",
        "fen": "rnbqkbnr/pppp1ppp/8/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R b KQkq -",
        "accuracies": { "white": 90.1, "black": 85.3 },
        "white": { "username": white.0, "rating": white.1, "result": white.2 },
        "black": { "username": black.0, "rating": black.1, "result": black.2 }
    })
}

/// `hikaru` with two monthly archives: 2023/12 (two games) and 2024/01
/// (three games).
pub fn hikaru_upstream() -> Upstream {
    Upstream::default()
        .with_archive(
            "hikaru",
            2023,
            12,
            vec![
                game("dec-1", 1_701_500_000, ("Hikaru", 3200, "win"), ("magnus", 3150, "resigned")),
                game("dec-2", 1_702_500_000, ("fabi", 3100, "win"), ("Hikaru", 3190, "timeout")),
            ],
        )
        .with_archive(
            "hikaru",
            2024,
            1,
            vec![
                game("jan-1", 1_704_200_000, ("Hikaru", 3210, "win"), ("fabi", 3090, "checkmated")),
                game("jan-2", 1_704_300_000, ("magnus", 3160, "agreed"), ("Hikaru", 3215, "agreed")),
                timed_game(
                    "jan-3",
                    1_704_400_000,
                    "bullet",
                    ("Hikaru", 3300, "win"),
                    ("magnus", 3280, "timeout"),
                ),
            ],
        )
}

/// A running app wired to a fake upstream and a scratch SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    pub db: DatabaseConnection,
    pub upstream: Arc<Upstream>,
    _dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// `X-Cache` header, when present.
    pub cache: Option<String>,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestResponse {
    async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let cache = res
            .headers()
            .get("x-cache")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let text = res.text().await.expect("Failed to read response body");
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self {
            status,
            cache,
            body,
        }
    }
}

impl TestApp {
    pub async fn spawn(upstream: Upstream) -> Self {
        Self::spawn_with_cache(upstream, CacheConfig::default()).await
    }

    pub async fn spawn_with_cache(upstream: Upstream, cache: CacheConfig) -> Self {
        let upstream = Arc::new(upstream);
        let upstream_listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind upstream");
        let upstream_addr = upstream_listener.local_addr().unwrap();
        let upstream_router = Router::new()
            .fallback(serve_upstream)
            .with_state(Arc::clone(&upstream));
        tokio::spawn(async move {
            axum::serve(upstream_listener, upstream_router).await.unwrap();
        });

        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let db_url = format!("sqlite://{}?mode=rwc", dir.path().join("test.db").display());

        let app_config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database: DatabaseConfig {
                url: db_url,
                max_connections: 1,
                min_connections: 1,
            },
            chesscom: ChessComConfig {
                base_url: format!("http://{upstream_addr}/pub"),
                timeout_secs: 5,
                ..Default::default()
            },
            cache,
            refresh: RefreshConfig::default(),
        };

        let db = chess_elo_api::database::init_db(&app_config.database)
            .await
            .expect("Failed to initialize test database");
        let chess = chesscom::HttpChessClient::new(&app_config.chesscom)
            .expect("Failed to build upstream client");

        let state = AppState {
            db: db.clone(),
            chess: Arc::new(chess),
            cache: Arc::new(ResponseCache::new(app_config.cache.enabled)),
            config: app_config,
        };

        let app = chess_elo_api::build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, ServiceExt::<Request>::into_make_service(app))
                .await
                .unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            db,
            upstream,
            _dir: dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    /// Scrape every archive of `username` and assert success.
    pub async fn scrape_all(&self, username: &str) -> Value {
        let res = self.get(&routes::scrape(username)).await;
        assert_eq!(res.status, 200, "scrape failed: {}", res.body);
        res.body
    }
}
