use async_trait::async_trait;
use sqlx::PgPool;

use super::category_models::Category;
use crate::{error::Result, user::UserId};

#[async_trait]
pub trait CategoryRepository: Send + Sync {
    async fn create(&self, name: &str, user_id: UserId) -> Result<Category>;
    /// Newest first.
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Category>>;
    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Category>>;
    /// Tasks referencing the category keep existing with their category cleared.
    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64>;
}

#[derive(Clone)]
pub struct PgCategoryRepository {
    pool: PgPool,
}

impl PgCategoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CategoryRepository for PgCategoryRepository {
    async fn create(&self, name: &str, user_id: UserId) -> Result<Category> {
        let category = sqlx::query_as::<_, Category>(
            "INSERT INTO categories (name, user_id)
             VALUES ($1, $2)
             RETURNING id, name, user_id, created_at",
        )
        .bind(name)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(category)
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Category>> {
        let categories = sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id, created_at
             FROM categories
             WHERE user_id = $1
             ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Category>> {
        let category = sqlx::query_as::<_, Category>(
            "SELECT id, name, user_id, created_at FROM categories WHERE id = $1 AND user_id = $2",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(category)
    }

    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
