use std::sync::Arc;

use tracing::{debug, info};

use super::{category_models::Category, category_repository::CategoryRepository};
use crate::{
    error::{AppError, Result},
    task::{Task, TaskRepository},
    user::UserId,
};

/// Rejects a category reference that does not resolve to a category owned by `user_id`.
pub async fn ensure_category_owned(
    categories: &dyn CategoryRepository,
    user_id: UserId,
    category_id: Option<i64>,
) -> Result<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    match categories.find_by_id(category_id, user_id).await? {
        Some(_) => Ok(()),
        None => Err(AppError::Validation(format!(
            "Category {category_id} does not exist"
        ))),
    }
}

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepository>,
    tasks: Arc<dyn TaskRepository>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepository>, tasks: Arc<dyn TaskRepository>) -> Self {
        Self { categories, tasks }
    }

    pub async fn create_category(&self, user_id: UserId, name: &str) -> Result<Category> {
        let name = name.trim();
        if name.is_empty() {
            return Err(AppError::Validation(
                "Category name must not be blank".to_string(),
            ));
        }

        let category = self.categories.create(name, user_id).await?;
        info!(user_id = %user_id, category_id = category.id, "Created category");
        Ok(category)
    }

    pub async fn list_categories(&self, user_id: UserId) -> Result<Vec<Category>> {
        self.categories.find_all_by_user(user_id).await
    }

    /// Tasks in the category survive with their category cleared.
    pub async fn delete_category(&self, user_id: UserId, category_id: i64) -> Result<()> {
        let rows_affected = self.categories.delete(category_id, user_id).await?;
        if rows_affected == 0 {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        info!(user_id = %user_id, category_id, "Deleted category");
        Ok(())
    }

    pub async fn list_tasks_by_category(
        &self,
        user_id: UserId,
        category_id: i64,
    ) -> Result<Vec<Task>> {
        if self
            .categories
            .find_by_id(category_id, user_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound("Category not found".to_string()));
        }

        self.tasks.find_by_category(category_id, user_id).await
    }

    /// Moves a task into `category_id`, or out of any category when `None`.
    pub async fn reassign_task_category(
        &self,
        user_id: UserId,
        task_id: i64,
        category_id: Option<i64>,
    ) -> Result<()> {
        ensure_category_owned(self.categories.as_ref(), user_id, category_id).await?;

        if !self.tasks.set_category(task_id, user_id, category_id).await? {
            return Err(AppError::NotFound("Task not found".to_string()));
        }

        debug!(user_id = %user_id, task_id, ?category_id, "Reassigned task category");
        Ok(())
    }
}
