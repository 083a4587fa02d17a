use super::*;
use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use shared::domain::Outcome;
use storage::{MemoryIdentityStore, PLAYER_NAME_KEY};
use tokio::{
    net::TcpListener,
    sync::{oneshot, Mutex},
};

use crate::session::{GuessDisposition, SessionController, StartDisposition};

#[derive(Clone)]
struct ServerState {
    guess_tx: Arc<Mutex<Option<oneshot::Sender<Value>>>>,
    guess_reply: Arc<Mutex<(StatusCode, Value)>>,
    limit_tx: Arc<Mutex<Option<oneshot::Sender<u32>>>>,
}

impl ServerState {
    fn new() -> Self {
        Self {
            guess_tx: Arc::new(Mutex::new(None)),
            guess_reply: Arc::new(Mutex::new((StatusCode::OK, guess_reply_body()))),
            limit_tx: Arc::new(Mutex::new(None)),
        }
    }
}

fn guess_reply_body() -> Value {
    json!({
        "game_id": 7,
        "word_display": "M _ _ _ _",
        "guessed_letters": ["M"],
        "wrong_guesses": 0,
        "max_wrong": 6,
        "status": "playing",
        "points": 0,
        "message": "🎯 Hit! The letter 'M' is in the word!",
        "hint": "Combine two branches",
        "correct_word": null
    })
}

async fn handle_new_game() -> Json<Value> {
    Json(json!({
        "game_id": 7,
        "category": "GIT",
        "hint": "Combine two branches",
        "word_display": "_____",
        "max_wrong": 6
    }))
}

async fn handle_guess(
    State(state): State<ServerState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if let Some(tx) = state.guess_tx.lock().await.take() {
        let _ = tx.send(body);
    }
    let (status, reply) = state.guess_reply.lock().await.clone();
    (status, Json(reply))
}

#[derive(serde::Deserialize)]
struct LimitQuery {
    limit: u32,
}

async fn handle_leaderboard(
    State(state): State<ServerState>,
    Query(query): Query<LimitQuery>,
) -> Json<Value> {
    if let Some(tx) = state.limit_tx.lock().await.take() {
        let _ = tx.send(query.limit);
    }
    Json(json!([
        { "name": "octocat", "total_points": 270, "rank": 1 },
        { "name": "hubot", "total_points": 90, "rank": 2 }
    ]))
}

async fn handle_stats() -> Json<Value> {
    Json(json!({
        "total_games": 12,
        "won_games": 9,
        "total_players": 4,
        "win_rate": 75.0
    }))
}

async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "healthy" }))
}

fn game_routes(state: ServerState) -> Router {
    Router::new()
        .route("/game/new", get(handle_new_game))
        .route("/game/guess", post(handle_guess))
        .route("/leaderboard", get(handle_leaderboard))
        .route("/stats", get(handle_stats))
        .route("/health", get(handle_health))
        .with_state(state)
}

async fn spawn_game_server(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn new_puzzle_decodes_service_payload() {
    let server_url = spawn_game_server(game_routes(ServerState::new())).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let puzzle = service.new_puzzle().await.expect("puzzle");

    assert_eq!(puzzle.session_id, SessionId(7));
    assert_eq!(puzzle.category, "GIT");
    assert_eq!(puzzle.word_display, "_____");
    assert_eq!(puzzle.max_wrong, 6);
}

#[tokio::test]
async fn submit_guess_posts_session_letter_and_player() {
    let state = ServerState::new();
    let (tx, rx) = oneshot::channel();
    *state.guess_tx.lock().await = Some(tx);
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let reply = service
        .submit_guess(
            SessionId(7),
            Letter::parse('m').expect("letter"),
            Some("octocat"),
        )
        .await
        .expect("guess");

    let body = rx.await.expect("request body");
    assert_eq!(
        body,
        json!({ "game_id": 7, "letter": "M", "user_name": "octocat" })
    );
    assert_eq!(reply.status, Outcome::InProgress);
    assert_eq!(reply.guessed_letters, vec![Letter::parse('M').expect("letter")]);
}

#[tokio::test]
async fn client_errors_become_validation_with_detail() {
    let state = ServerState::new();
    *state.guess_reply.lock().await = (
        StatusCode::BAD_REQUEST,
        json!({ "detail": "Letter already guessed" }),
    );
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let err = service
        .submit_guess(SessionId(7), Letter::parse('M').expect("letter"), None)
        .await
        .expect_err("rejected");

    match err {
        GameServiceError::Validation { status, detail } => {
            assert_eq!(status, 400);
            assert_eq!(detail, "Letter already guessed");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn unprocessable_entity_uses_first_structured_message() {
    let state = ServerState::new();
    *state.guess_reply.lock().await = (
        StatusCode::UNPROCESSABLE_ENTITY,
        json!({ "detail": [{ "loc": ["body", "game_id"], "msg": "field required", "type": "missing" }] }),
    );
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let err = service
        .submit_guess(SessionId(7), Letter::parse('M').expect("letter"), None)
        .await
        .expect_err("rejected");

    assert!(err.is_validation());
    assert_eq!(err.user_message("fallback"), "field required");
}

#[tokio::test]
async fn server_errors_are_service_failures() {
    let state = ServerState::new();
    *state.guess_reply.lock().await = (
        StatusCode::INTERNAL_SERVER_ERROR,
        json!({ "detail": "database unavailable" }),
    );
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let err = service
        .submit_guess(SessionId(7), Letter::parse('M').expect("letter"), None)
        .await
        .expect_err("failure");

    assert!(matches!(err, GameServiceError::Service { status: 500, .. }));
    assert_eq!(err.user_message("Failed to submit guess"), "Failed to submit guess");
}

#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let state = ServerState::new();
    *state.guess_reply.lock().await = (StatusCode::OK, json!({ "unexpected": true }));
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let err = service
        .submit_guess(SessionId(7), Letter::parse('M').expect("letter"), None)
        .await
        .expect_err("decode failure");

    assert!(matches!(err, GameServiceError::Decode(_)));
}

#[tokio::test]
async fn leaderboard_sends_limit_and_stats_decode() {
    let state = ServerState::new();
    let (tx, rx) = oneshot::channel();
    *state.limit_tx.lock().await = Some(tx);
    let server_url = spawn_game_server(game_routes(state)).await;
    let service = HttpGameService::new(&server_url).expect("service");

    let entries = service.leaderboard(20).await.expect("leaderboard");
    assert_eq!(rx.await.expect("limit"), 20);
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].name, "octocat");
    assert_eq!(entries[0].rank, 1);

    let stats = service.global_stats().await.expect("stats");
    assert_eq!(stats.total_games, 12);
    assert_eq!(stats.won_games, 9);
    assert!((stats.win_rate_percent - 75.0).abs() < f64::EPSILON);

    assert_eq!(service.health().await.expect("health").status, "healthy");
}

#[tokio::test]
async fn base_url_path_prefix_is_preserved() {
    let app = Router::new().nest("/api", game_routes(ServerState::new()));
    let server_url = spawn_game_server(app).await;
    let service = HttpGameService::new(&format!("{server_url}/api")).expect("service");

    assert!(service.base_url().as_str().ends_with("/api/"));
    service.new_puzzle().await.expect("puzzle under prefix");
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    drop(listener);
    let service = HttpGameService::new(&format!("http://{addr}")).expect("service");

    let err = service.new_puzzle().await.expect_err("unreachable");

    assert!(matches!(err, GameServiceError::Transport(_)));
    assert!(!err.is_validation());
}

#[tokio::test]
async fn rejects_unparseable_base_url() {
    assert!(matches!(
        HttpGameService::new("not a url"),
        Err(GameServiceError::InvalidBaseUrl(_))
    ));
}

#[tokio::test]
async fn controller_plays_against_http_service() {
    let server_url = spawn_game_server(game_routes(ServerState::new())).await;
    let service = Arc::new(HttpGameService::new(&server_url).expect("service"));
    let identity = Arc::new(MemoryIdentityStore::with_value(PLAYER_NAME_KEY, "octocat"));
    let controller = SessionController::new(service, identity);

    assert_eq!(
        controller.start_session().await.expect("start"),
        StartDisposition::Started(SessionId(7))
    );
    assert_eq!(
        controller.submit_guess('m').await.expect("guess"),
        GuessDisposition::Applied(Outcome::InProgress)
    );

    let session = controller.snapshot().await.session.expect("session");
    assert_eq!(session.display_pattern.to_string(), "M _ _ _ _");
    assert_eq!(session.category, "GIT");
    assert_eq!(session.guessed_letters.len(), 1);
}
