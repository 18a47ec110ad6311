use std::sync::Arc;

use tracing::info;

use crate::auth::{create_access_token, hash_password, verify_password};
use crate::error::{AppError, Result};
use crate::user::{User, UserRepository};

#[derive(Clone)]
pub struct AuthService {
    user_repo: Arc<dyn UserRepository>,
    jwt_secret: String,
    jwt_expiration_hours: i64,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        user_repo: Arc<dyn UserRepository>,
        jwt_secret: String,
        jwt_expiration_hours: i64,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            user_repo,
            jwt_secret,
            jwt_expiration_hours,
            bcrypt_cost,
        }
    }

    pub async fn register(&self, email: &str, password: &str, name: &str) -> Result<(User, String)> {
        let password_hash = hash_password(password, self.bcrypt_cost)?;
        let user = self.user_repo.create(email, &password_hash, name).await?;
        let token = self.issue_token(&user)?;

        info!(user_id = %user.id, "Registered user");
        Ok((user, token))
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<(User, String)> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }

        let token = self.issue_token(&user)?;
        Ok((user, token))
    }

    fn issue_token(&self, user: &User) -> Result<String> {
        create_access_token(
            user.id,
            &user.email,
            &self.jwt_secret,
            self.jwt_expiration_hours,
        )
    }
}
