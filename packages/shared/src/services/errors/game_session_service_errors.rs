use crate::repositories::errors::match_repository_errors::MatchRepositoryError;
use crate::services::errors::chess_service_errors::ChessServiceError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameSessionServiceError {
    /// No session (or lobby) for the id.
    NotFound,
    /// Caller is not the side to move, or not a player in this session.
    NotYourTurn,
    /// Caller holds neither seat of the session.
    NotAPlayer,
    IllegalMove(String),
    InvalidNotation(String),
    GameOver,
    /// A session already exists for the lobby.
    AlreadyStarted,
    ValidationError(String),
    RulesEngine(String),
    RepositoryError(String),
}

impl std::fmt::Display for GameSessionServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GameSessionServiceError::NotFound => write!(f, "Game not found"),
            GameSessionServiceError::NotYourTurn => write!(f, "Not your turn"),
            GameSessionServiceError::NotAPlayer => write!(f, "You are not a player in this game"),
            GameSessionServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
            GameSessionServiceError::InvalidNotation(msg) => {
                write!(f, "Invalid move notation: {}", msg)
            }
            GameSessionServiceError::GameOver => write!(f, "Game is already over"),
            GameSessionServiceError::AlreadyStarted => write!(f, "Game already started"),
            GameSessionServiceError::ValidationError(msg) => {
                write!(f, "Validation error: {}", msg)
            }
            GameSessionServiceError::RulesEngine(msg) => write!(f, "Rules engine error: {}", msg),
            GameSessionServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for GameSessionServiceError {}

impl From<ChessServiceError> for GameSessionServiceError {
    fn from(err: ChessServiceError) -> Self {
        match err {
            ChessServiceError::IllegalMove(msg) => GameSessionServiceError::IllegalMove(msg),
            ChessServiceError::InvalidNotation(msg) => {
                GameSessionServiceError::InvalidNotation(msg)
            }
            ChessServiceError::InvalidPosition(msg) => GameSessionServiceError::RulesEngine(msg),
        }
    }
}

impl From<MatchRepositoryError> for GameSessionServiceError {
    fn from(err: MatchRepositoryError) -> Self {
        GameSessionServiceError::RepositoryError(err.to_string())
    }
}
