use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::{debug, info, warn};

use crate::{error::ApiError, middleware::auth::AuthenticatedUser, state::AppState};
use shared::models::lobby::{JoinOutcome, LeaveOutcome};
use shared::models::requests::{CreateLobbyRequest, JoinLobbyRequest, LeaveLobbyRequest};
use shared::models::responses::{JoinLobbyResponse, LobbyResponse};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/lobbies", post(create_lobby).get(list_lobbies))
        .route("/lobbies/join", post(join_lobby))
        .route("/lobbies/leave", post(leave_lobby))
}

async fn create_lobby(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<CreateLobbyRequest>,
) -> Result<(StatusCode, Json<LobbyResponse>), ApiError> {
    let lobby = state
        .lobby_registry
        .create_lobby(&authenticated_user.user_id, &payload)
        .await?;
    Ok((StatusCode::CREATED, Json(lobby)))
}

async fn list_lobbies(State(state): State<AppState>) -> Json<Vec<LobbyResponse>> {
    Json(state.lobby_registry.list_joinable().await)
}

async fn join_lobby(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<JoinLobbyRequest>,
) -> (StatusCode, Json<JoinLobbyResponse>) {
    let outcome = state
        .lobby_registry
        .join(
            &authenticated_user.user_id,
            &payload.lobby_id,
            payload.secret.as_deref(),
        )
        .await;

    let status = match outcome {
        JoinOutcome::Joined(_) | JoinOutcome::AlreadyMember => StatusCode::OK,
        JoinOutcome::NotFound => StatusCode::NOT_FOUND,
        JoinOutcome::WrongSecret => StatusCode::FORBIDDEN,
        JoinOutcome::Full => StatusCode::CONFLICT,
    };
    if !outcome.is_success() {
        debug!(
            "Join of lobby {} by {} refused: {:?}",
            payload.lobby_id, authenticated_user.user_id, outcome
        );
        let body = JoinLobbyResponse {
            success: false,
            lobby_id: None,
            message: outcome.message().to_string(),
            session_started: false,
        };
        return (status, Json(body));
    }

    // The second seat filling is what starts the game.
    match state
        .session_directory
        .start_session(&payload.lobby_id)
        .await
    {
        Ok(Some(session)) => info!(
            "Lobby {} is full, session {} started",
            payload.lobby_id, session.session_id
        ),
        Ok(None) => {}
        Err(e) => debug!("Session for lobby {} not started: {}", payload.lobby_id, e),
    }

    let body = JoinLobbyResponse {
        success: true,
        lobby_id: Some(payload.lobby_id),
        message: outcome.message().to_string(),
        session_started: state.session_directory.contains(&payload.lobby_id),
    };
    (status, Json(body))
}

async fn leave_lobby(
    State(state): State<AppState>,
    authenticated_user: AuthenticatedUser,
    Json(payload): Json<LeaveLobbyRequest>,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .lobby_registry
        .leave(&authenticated_user.user_id, &payload.lobby_id)
        .await;

    match outcome {
        LeaveOutcome::GameInProgress => {
            warn!(
                "User {} tried to leave lobby {} mid-game",
                authenticated_user.user_id, payload.lobby_id
            );
            Err(ApiError::GameInProgress)
        }
        _ => Ok(StatusCode::NO_CONTENT),
    }
}
