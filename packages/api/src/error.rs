use std::fmt;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use shared::models::responses::ErrorResponse;
use shared::services::errors::{
    auth_service_errors::AuthServiceError, game_session_service_errors::GameSessionServiceError,
    lobby_service_errors::LobbyServiceError, user_service_errors::UserServiceError,
};

#[derive(Debug)]
pub enum ApiError {
    AuthService(AuthServiceError),
    UserService(UserServiceError),
    LobbyService(LobbyServiceError),
    GameSessionService(GameSessionServiceError),
    /// Leave was refused because the lobby's game is running.
    GameInProgress,
}

impl From<AuthServiceError> for ApiError {
    fn from(error: AuthServiceError) -> Self {
        ApiError::AuthService(error)
    }
}

impl From<UserServiceError> for ApiError {
    fn from(error: UserServiceError) -> Self {
        ApiError::UserService(error)
    }
}

impl From<LobbyServiceError> for ApiError {
    fn from(error: LobbyServiceError) -> Self {
        ApiError::LobbyService(error)
    }
}

impl From<GameSessionServiceError> for ApiError {
    fn from(error: GameSessionServiceError) -> Self {
        ApiError::GameSessionService(error)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthService(e) => write!(f, "{}", e),
            ApiError::UserService(e) => write!(f, "{}", e),
            ApiError::LobbyService(e) => write!(f, "{}", e),
            ApiError::GameSessionService(e) => write!(f, "{}", e),
            ApiError::GameInProgress => write!(f, "Cannot leave a lobby while its game is running"),
        }
    }
}

/// Status code for a session engine rejection.
pub fn game_session_status(error: &GameSessionServiceError) -> StatusCode {
    match error {
        GameSessionServiceError::NotFound => StatusCode::NOT_FOUND,
        GameSessionServiceError::NotAPlayer => StatusCode::FORBIDDEN,
        GameSessionServiceError::NotYourTurn
        | GameSessionServiceError::GameOver
        | GameSessionServiceError::AlreadyStarted => StatusCode::CONFLICT,
        GameSessionServiceError::IllegalMove(_)
        | GameSessionServiceError::InvalidNotation(_)
        | GameSessionServiceError::ValidationError(_) => StatusCode::BAD_REQUEST,
        GameSessionServiceError::RulesEngine(_) | GameSessionServiceError::RepositoryError(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::AuthService(AuthServiceError::JwtError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            ApiError::AuthService(
                AuthServiceError::MissingToken
                | AuthServiceError::InvalidToken
                | AuthServiceError::ExpiredToken,
            ) => StatusCode::UNAUTHORIZED,

            ApiError::UserService(UserServiceError::UserNotFound) => StatusCode::NOT_FOUND,
            ApiError::UserService(UserServiceError::ValidationError(_)) => StatusCode::BAD_REQUEST,
            ApiError::UserService(UserServiceError::RepositoryError(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            ApiError::LobbyService(LobbyServiceError::ValidationError(_)) => {
                StatusCode::BAD_REQUEST
            }

            ApiError::GameSessionService(e) => game_session_status(e),

            ApiError::GameInProgress => StatusCode::CONFLICT,
        };

        let body = ErrorResponse {
            error: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
