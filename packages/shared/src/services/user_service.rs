use std::sync::Arc;
use tracing::debug;

use crate::models::user::User;
use crate::repositories::user_repository::UserRepository;
use crate::services::errors::user_service_errors::UserServiceError;

/// Read access to player profiles owned by the identity system.
pub struct UserService {
    repository: Arc<dyn UserRepository + Send + Sync>,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository + Send + Sync>) -> Self {
        UserService { repository }
    }

    pub async fn get_user_by_id(&self, user_id: &str) -> Result<User, UserServiceError> {
        if user_id.is_empty() {
            return Err(UserServiceError::ValidationError(
                "User ID cannot be empty".to_string(),
            ));
        }
        Ok(self.repository.get_user_by_id(user_id).await?)
    }

    /// Nickname when a profile exists, otherwise the raw user id.
    pub async fn display_name(&self, user_id: &str) -> String {
        match self.get_user_by_id(user_id).await {
            Ok(user) if !user.nickname.trim().is_empty() => user.nickname,
            Ok(_) => user_id.to_string(),
            Err(e) => {
                debug!("No profile for {}: {}", user_id, e);
                user_id.to_string()
            }
        }
    }
}
