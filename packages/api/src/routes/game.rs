use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use tracing::debug;
use uuid::Uuid;

use crate::{
    error::{game_session_status, ApiError},
    middleware::auth::AuthenticatedUser,
    state::AppState,
};
use shared::models::requests::{MakeMoveRequest, SyncClockRequest};
use shared::models::responses::{GameStateResponse, MoveResponse, SyncClockResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/games/move", post(make_move))
        .route("/games/sync-clock", post(sync_clock))
        .route("/games/{lobby_id}/state", get(game_state))
}

async fn make_move(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<MakeMoveRequest>,
) -> (StatusCode, Json<MoveResponse>) {
    match state
        .game_session_service
        .submit_move(&authenticated_user.user_id, &payload)
        .await
    {
        Ok(result) => {
            let message = match result.outcome.result_notation() {
                Some(notation) if result.is_game_over => format!("Game over: {}", notation),
                _ => "Move accepted".to_string(),
            };
            let body = MoveResponse {
                success: true,
                new_position: Some(result.position),
                is_game_over: result.is_game_over,
                message,
            };
            (StatusCode::OK, Json(body))
        }
        Err(e) => {
            debug!(
                "Move by {} in lobby {} rejected: {}",
                authenticated_user.user_id, payload.lobby_id, e
            );
            let body = MoveResponse {
                success: false,
                new_position: None,
                is_game_over: false,
                message: e.to_string(),
            };
            (game_session_status(&e), Json(body))
        }
    }
}

async fn sync_clock(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<SyncClockRequest>,
) -> Result<Json<SyncClockResponse>, ApiError> {
    state
        .game_session_service
        .sync_clock(&authenticated_user.user_id, &payload)
        .await?;
    Ok(Json(SyncClockResponse { success: true }))
}

async fn game_state(
    State(state): State<AppState>,
    Path(lobby_id): Path<Uuid>,
) -> Result<Json<GameStateResponse>, ApiError> {
    let view = state.game_session_service.game_state(&lobby_id).await?;
    Ok(Json(view))
}
