use async_trait::async_trait;
use sqlx::PgPool;

use super::task_models::{NewTask, Task, TaskChanges, TaskRow};
use crate::{
    error::{AppError, Result},
    user::UserId,
};

/// Task persistence. Every read returns tasks with their category resolved.
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn create(&self, task: NewTask) -> Result<Task>;
    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Task>>;
    /// Ordered by [`Task::list_order`].
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Task>>;
    /// Ordered by [`Task::list_order`].
    async fn find_by_category(&self, category_id: i64, user_id: UserId) -> Result<Vec<Task>>;
    async fn update(&self, id: i64, user_id: UserId, changes: TaskChanges) -> Result<Option<Task>>;
    /// Returns whether a task owned by `user_id` matched.
    async fn set_category(
        &self,
        id: i64,
        user_id: UserId,
        category_id: Option<i64>,
    ) -> Result<bool>;
    /// Also removes the task's notifications.
    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64>;
}

const SELECT_WITH_CATEGORY: &str = "SELECT t.id, t.title, t.description, t.completed, t.user_id,
            t.category_id, t.due_date, t.priority, t.created_at, t.updated_at,
            c.name AS category_name, c.created_at AS category_created_at";

const LIST_ORDER: &str = "ORDER BY t.due_date ASC, t.priority DESC, t.created_at DESC, t.id DESC";

/// A category deleted between the ownership check and the write is reported
/// like any other unknown category.
fn map_category_fk(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(ref db_err)
            if db_err.is_foreign_key_violation()
                && db_err.constraint().is_some_and(|c| c.contains("category")) =>
        {
            AppError::Validation("Category does not exist".to_string())
        }
        other => AppError::Database(other),
    }
}

#[derive(Clone)]
pub struct PgTaskRepository {
    pool: PgPool,
}

impl PgTaskRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TaskRepository for PgTaskRepository {
    async fn create(&self, task: NewTask) -> Result<Task> {
        let query = format!(
            "WITH t AS (
                INSERT INTO tasks (title, description, user_id, category_id, due_date, priority)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
             )
             {SELECT_WITH_CATEGORY}
             FROM t LEFT JOIN categories c ON c.id = t.category_id"
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(&task.title)
            .bind(task.description.as_deref())
            .bind(task.user_id)
            .bind(task.category_id)
            .bind(task.due_date)
            .bind(task.priority)
            .fetch_one(&self.pool)
            .await
            .map_err(map_category_fk)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Task>> {
        let query = format!(
            "{SELECT_WITH_CATEGORY}
             FROM tasks t LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.id = $1 AND t.user_id = $2"
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Task::from))
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Task>> {
        let query = format!(
            "{SELECT_WITH_CATEGORY}
             FROM tasks t LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.user_id = $1
             {LIST_ORDER}"
        );

        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn find_by_category(&self, category_id: i64, user_id: UserId) -> Result<Vec<Task>> {
        let query = format!(
            "{SELECT_WITH_CATEGORY}
             FROM tasks t LEFT JOIN categories c ON c.id = t.category_id
             WHERE t.category_id = $1 AND t.user_id = $2
             {LIST_ORDER}"
        );

        let rows = sqlx::query_as::<_, TaskRow>(&query)
            .bind(category_id)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn update(&self, id: i64, user_id: UserId, changes: TaskChanges) -> Result<Option<Task>> {
        let query = format!(
            "WITH t AS (
                UPDATE tasks SET
                    title = $1,
                    description = $2,
                    completed = $3,
                    category_id = $4,
                    due_date = $5,
                    priority = $6,
                    updated_at = GREATEST(NOW(), created_at)
                WHERE id = $7 AND user_id = $8
                RETURNING *
             )
             {SELECT_WITH_CATEGORY}
             FROM t LEFT JOIN categories c ON c.id = t.category_id"
        );

        let row = sqlx::query_as::<_, TaskRow>(&query)
            .bind(&changes.title)
            .bind(changes.description.as_deref())
            .bind(changes.completed)
            .bind(changes.category_id)
            .bind(changes.due_date)
            .bind(changes.priority)
            .bind(id)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_category_fk)?;

        Ok(row.map(Task::from))
    }

    async fn set_category(
        &self,
        id: i64,
        user_id: UserId,
        category_id: Option<i64>,
    ) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE tasks SET category_id = $1, updated_at = GREATEST(NOW(), created_at)
             WHERE id = $2 AND user_id = $3",
        )
        .bind(category_id)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(map_category_fk)?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}
