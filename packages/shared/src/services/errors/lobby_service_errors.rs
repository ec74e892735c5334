#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LobbyServiceError {
    ValidationError(String),
}

impl std::fmt::Display for LobbyServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LobbyServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
        }
    }
}

impl std::error::Error for LobbyServiceError {}
