//! Router-level tests for the lobby and game endpoints
//!
//! Everything runs in-process against in-memory repositories.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use session_api::create_app;
use session_api::state::AppState;
use shared::models::user::User;
use shared::repositories::match_repository::InMemoryMatchRepository;
use shared::repositories::user_repository::InMemoryUserRepository;
use shared::services::auth_service::AuthService;

const SECRET: &str = "test-secret-key";

fn user(id: &str, nickname: &str) -> User {
    let mut user = User::new(format!("{}@example.com", id), nickname.to_string());
    user.id = id.to_string();
    user
}

fn test_app() -> Router {
    let users = InMemoryUserRepository::with_users(vec![user("u1", "Alice"), user("u2", "Bob")]);
    let state = AppState::new(
        AuthService::new(SECRET),
        Arc::new(users),
        Arc::new(InMemoryMatchRepository::new()),
        16,
        Duration::from_millis(500),
    );
    create_app(state)
}

fn token(user_id: &str) -> String {
    AuthService::new(SECRET)
        .generate_token(user_id)
        .unwrap()
        .token
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    user_id: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if let Some(user_id) = user_id {
        request = request.header("Authorization", format!("Bearer {}", token(user_id)));
    }
    let request = match body {
        Some(body) => request
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&body).unwrap()))
            .unwrap(),
        None => request.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn create_lobby(app: &Router, user_id: &str, body: Value) -> String {
    let (status, lobby) = send(app, "POST", "/lobbies", Some(user_id), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    lobby["lobbyId"].as_str().unwrap().to_string()
}

/// Full lobby with a running game; returns (lobby id, white id, black id).
async fn started_game(app: &Router) -> (String, String, String) {
    let lobby_id = create_lobby(app, "u1", json!({ "initialTimeSeconds": 120 })).await;
    let (status, joined) = send(
        app,
        "POST",
        "/lobbies/join",
        Some("u2"),
        Some(json!({ "lobbyId": lobby_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(joined["sessionStarted"], true);

    let (_, state) = send(app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    let white = state["whitePlayerId"].as_str().unwrap().to_string();
    let black = state["blackPlayerId"].as_str().unwrap().to_string();
    (lobby_id, white, black)
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_create_lobby_requires_token() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/lobbies", None, Some(json!({}))).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_create_lobby_defaults_and_hides_secret() {
    let app = test_app();

    let (status, lobby) = send(
        &app,
        "POST",
        "/lobbies",
        Some("u9"),
        Some(json!({ "isPublic": false, "secret": "p@ss" })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(lobby["name"], "u9's Game");
    assert_eq!(lobby["seatAOccupantId"], "u9");
    assert_eq!(lobby["isPublic"], false);
    assert_eq!(lobby["initialTimeSeconds"], 300);
    assert_eq!(lobby["incrementSeconds"], 3);
    assert!(!lobby.to_string().contains("p@ss"));
}

#[tokio::test]
async fn test_create_lobby_rejects_negative_time() {
    let app = test_app();

    let (status, _) = send(
        &app,
        "POST",
        "/lobbies",
        Some("u1"),
        Some(json!({ "initialTimeSeconds": -10 })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_list_lobbies_shows_open_lobbies_only() {
    let app = test_app();
    let open = create_lobby(&app, "u1", json!({ "name": "Open" })).await;
    let (_, white, _) = started_game(&app).await;
    assert!(!white.is_empty());

    let (status, lobbies) = send(&app, "GET", "/lobbies", None, None).await;

    assert_eq!(status, StatusCode::OK);
    let listed = lobbies.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["lobbyId"], open.as_str());
    assert_eq!(listed[0]["seatAOccupantName"], "Alice");
    assert_eq!(listed[0]["isFull"], false);
}

#[tokio::test]
async fn test_join_outcomes() {
    let app = test_app();
    let lobby_id = create_lobby(
        &app,
        "u1",
        json!({ "isPublic": false, "secret": "p@ss" }),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/lobbies/join",
        Some("u2"),
        Some(json!({ "lobbyId": lobby_id, "secret": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/lobbies/join",
        Some("u2"),
        Some(json!({ "lobbyId": lobby_id, "secret": "p@ss" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["lobbyId"], lobby_id.as_str());

    let (status, body) = send(
        &app,
        "POST",
        "/lobbies/join",
        Some("u3"),
        Some(json!({ "lobbyId": lobby_id, "secret": "p@ss" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["message"], "Lobby is full");

    let (status, _) = send(
        &app,
        "POST",
        "/lobbies/join",
        Some("u2"),
        Some(json!({ "lobbyId": "00000000-0000-0000-0000-000000000000" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leave_before_and_during_game() {
    let app = test_app();
    let lobby_id = create_lobby(&app, "u1", json!({})).await;

    let (status, _) = send(
        &app,
        "POST",
        "/lobbies/leave",
        Some("u1"),
        Some(json!({ "lobbyId": lobby_id })),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (running, white, _) = started_game(&app).await;
    let (status, _) = send(
        &app,
        "POST",
        "/lobbies/leave",
        Some(white.as_str()),
        Some(json!({ "lobbyId": running })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_move_flow() {
    let app = test_app();
    let (lobby_id, white, black) = started_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/games/move",
        Some(black.as_str()),
        Some(json!({ "lobbyId": lobby_id, "from": "e7", "to": "e5" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);

    let (status, body) = send(
        &app,
        "POST",
        "/games/move",
        Some(white.as_str()),
        Some(json!({
            "lobbyId": lobby_id,
            "origin": "e2",
            "destination": "e4",
            "whiteRemainingSeconds": 115,
            "blackRemainingSeconds": 120
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["isGameOver"], false);
    assert!(body["newPosition"]
        .as_str()
        .unwrap()
        .starts_with("rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq"));

    let (status, body) = send(
        &app,
        "POST",
        "/games/move",
        Some(black.as_str()),
        Some(json!({ "lobbyId": lobby_id, "origin": "e7", "destination": "e4" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, state) =
        send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["lastMove"], "e2-e4");
    assert_eq!(state["sideToMove"], "black");
    assert_eq!(state["whiteRemainingSeconds"], 115);
    assert_eq!(state["blackRemainingSeconds"], 120);
    assert_eq!(state["isGameOver"], false);
}

#[tokio::test]
async fn test_fools_mate_is_recorded() {
    let app = test_app();
    let (lobby_id, white, black) = started_game(&app).await;

    let moves = [
        (&white, "f2f3"),
        (&black, "e7e5"),
        (&white, "g2g4"),
        (&black, "d8h4"),
    ];
    let mut last = Value::Null;
    for (player, notation) in moves {
        let (status, body) = send(
            &app,
            "POST",
            "/games/move",
            Some(player.as_str()),
            Some(json!({ "lobbyId": lobby_id, "from": notation })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        last = body;
    }
    assert_eq!(last["isGameOver"], true);
    assert_eq!(last["message"], "Game over: 0-1");

    let (status, _) = send(
        &app,
        "POST",
        "/games/move",
        Some(white.as_str()),
        Some(json!({ "lobbyId": lobby_id, "from": "e2e4" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, history) =
        send(&app, "GET", &format!("/players/{}/matches", black), None, None).await;
    assert_eq!(status, StatusCode::OK);
    let records = history.as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["result"], "0-1");
    assert_eq!(records[0]["moves"].as_array().unwrap().len(), 4);

    let (status, state) =
        send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["isGameOver"], true);
    assert_eq!(state["result"], "0-1");
    assert_eq!(state["whitePlayerId"], white.as_str());

    for player in [&white, &black] {
        let (status, _) = send(
            &app,
            "POST",
            "/lobbies/leave",
            Some(player.as_str()),
            Some(json!({ "lobbyId": lobby_id })),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
    let (status, _) = send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_sync_clock() {
    let app = test_app();
    let (lobby_id, white, _) = started_game(&app).await;

    let (status, body) = send(
        &app,
        "POST",
        "/games/sync-clock",
        Some(white.as_str()),
        Some(json!({
            "lobbyId": lobby_id,
            "whiteRemainingSeconds": 90,
            "blackRemainingSeconds": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (status, _) = send(
        &app,
        "POST",
        "/games/sync-clock",
        Some(white.as_str()),
        Some(json!({
            "lobbyId": "00000000-0000-0000-0000-000000000000",
            "whiteRemainingSeconds": 90,
            "blackRemainingSeconds": 100
        })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, state) = send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;
    assert_eq!(state["whiteRemainingSeconds"], 90);
    assert_eq!(state["blackRemainingSeconds"], 100);
}

#[tokio::test]
async fn test_state_before_game_uses_lobby() {
    let app = test_app();
    let lobby_id = create_lobby(&app, "u1", json!({ "initialTimeSeconds": 60 })).await;

    let (status, state) =
        send(&app, "GET", &format!("/games/{}/state", lobby_id), None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(state["whitePlayerId"], "u1");
    assert_eq!(state["whitePlayerName"], "Alice");
    assert_eq!(state["blackPlayerId"], Value::Null);
    assert_eq!(state["whiteRemainingSeconds"], 60);
    assert_eq!(state["sideToMove"], "white");
}
