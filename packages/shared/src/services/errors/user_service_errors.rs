use std::fmt;

use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserServiceError {
    UserNotFound,
    ValidationError(String),
    RepositoryError(String),
}

impl fmt::Display for UserServiceError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UserServiceError::UserNotFound => write!(f, "User not found"),
            UserServiceError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            UserServiceError::RepositoryError(msg) => write!(f, "Repository error: {}", msg),
        }
    }
}

impl std::error::Error for UserServiceError {}

impl From<UserRepositoryError> for UserServiceError {
    fn from(err: UserRepositoryError) -> Self {
        match err {
            UserRepositoryError::NotFound => UserServiceError::UserNotFound,
            other => UserServiceError::RepositoryError(other.to_string()),
        }
    }
}
