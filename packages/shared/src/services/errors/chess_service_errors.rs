use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChessServiceError {
    InvalidPosition(String),
    InvalidNotation(String),
    IllegalMove(String),
}

impl fmt::Display for ChessServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ChessServiceError::InvalidPosition(msg) => write!(f, "Invalid position: {}", msg),
            ChessServiceError::InvalidNotation(msg) => write!(f, "Invalid move notation: {}", msg),
            ChessServiceError::IllegalMove(msg) => write!(f, "Illegal move: {}", msg),
        }
    }
}

impl std::error::Error for ChessServiceError {}
