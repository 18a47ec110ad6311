use std::sync::Arc;

use tracing::info;

use crate::{
    error::{AppError, Result},
    user::{
        user_models::{UserId, UserResponse},
        user_repository::UserRepository,
    },
};

#[derive(Clone)]
pub struct UserService {
    user_repository: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(user_repository: Arc<dyn UserRepository>) -> Self {
        Self { user_repository }
    }

    pub async fn get_current_user(&self, user_id: UserId) -> Result<UserResponse> {
        let user = self
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        Ok(user.into())
    }

    pub async fn delete_account(&self, user_id: UserId) -> Result<()> {
        let rows_affected = self.user_repository.delete(user_id).await?;
        if rows_affected == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        info!(user_id = %user_id, "Deleted user account");
        Ok(())
    }
}
