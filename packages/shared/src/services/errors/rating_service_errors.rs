use crate::repositories::errors::user_repository_errors::UserRepositoryError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingServiceError {
    RepositoryError(UserRepositoryError),
}

impl std::fmt::Display for RatingServiceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RatingServiceError::RepositoryError(err) => write!(f, "Repository error: {}", err),
        }
    }
}

impl std::error::Error for RatingServiceError {}

impl From<UserRepositoryError> for RatingServiceError {
    fn from(err: UserRepositoryError) -> Self {
        RatingServiceError::RepositoryError(err)
    }
}
