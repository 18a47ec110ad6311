use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use crate::{
    category::{ensure_category_owned, CategoryRepository},
    error::{AppError, Result},
    task::{
        due_date::{parse_due_date, parse_optional_due_date},
        task_dto::{CreateTaskRequest, UpdateTaskRequest},
        task_models::{NewTask, Task, TaskChanges, TaskPriority},
        task_repository::TaskRepository,
    },
    user::UserId,
};

/// Service layer for task‑related business logic.
#[derive(Clone)]
pub struct TaskService {
    tasks: Arc<dyn TaskRepository>,
    categories: Arc<dyn CategoryRepository>,
}

impl TaskService {
    pub fn new(tasks: Arc<dyn TaskRepository>, categories: Arc<dyn CategoryRepository>) -> Self {
        Self { tasks, categories }
    }

    pub async fn create_task(&self, user_id: UserId, payload: CreateTaskRequest) -> Result<Task> {
        let due_date = parse_optional_due_date(payload.due_date.as_deref(), Utc::now())?;
        let priority = payload
            .priority
            .as_deref()
            .map(str::parse::<TaskPriority>)
            .transpose()?
            .unwrap_or_default();
        ensure_category_owned(self.categories.as_ref(), user_id, payload.category_id).await?;

        let task = self
            .tasks
            .create(NewTask {
                title: payload.title,
                description: payload.description,
                user_id,
                category_id: payload.category_id,
                due_date,
                priority,
            })
            .await?;

        info!(user_id = %user_id, task_id = task.id, "Created task");
        Ok(task)
    }

    pub async fn list_tasks(&self, user_id: UserId) -> Result<Vec<Task>> {
        self.tasks.find_all_by_user(user_id).await
    }

    pub async fn get_task(&self, user_id: UserId, task_id: i64) -> Result<Task> {
        self.tasks
            .find_by_id(task_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))
    }

    pub async fn update_task(
        &self,
        user_id: UserId,
        task_id: i64,
        payload: UpdateTaskRequest,
    ) -> Result<Task> {
        let due_date = parse_due_date(&payload.due_date)?;
        let priority: TaskPriority = payload.priority.parse()?;
        ensure_category_owned(self.categories.as_ref(), user_id, payload.category_id).await?;

        let changes = TaskChanges {
            title: payload.title,
            description: payload.description,
            completed: payload.completed,
            category_id: payload.category_id,
            due_date,
            priority,
        };

        let task = self
            .tasks
            .update(task_id, user_id, changes)
            .await?
            .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

        debug!(user_id = %user_id, task_id, completed = task.completed, "Updated task");
        Ok(task)
    }

    /// Idempotent: deleting a missing task succeeds.
    pub async fn delete_task(&self, user_id: UserId, task_id: i64) -> Result<()> {
        let rows_affected = self.tasks.delete(task_id, user_id).await?;
        if rows_affected == 0 {
            debug!(user_id = %user_id, task_id, "Delete of absent task ignored");
        } else {
            info!(user_id = %user_id, task_id, "Deleted task");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{db::MemoryDb, user::UserRepository};
    use chrono::{TimeZone, Utc};

    async fn setup() -> (MemoryDb, TaskService, UserId, UserId) {
        let db = MemoryDb::new();
        let alice = UserRepository::create(&db, "alice@x.com", "hash", "Alice")
            .await
            .unwrap()
            .id;
        let bob = UserRepository::create(&db, "bob@x.com", "hash", "Bob")
            .await
            .unwrap()
            .id;
        let service = TaskService::new(Arc::new(db.clone()), Arc::new(db.clone()));
        (db, service, alice, bob)
    }

    fn create_request(title: &str, due_date: &str, priority: &str) -> CreateTaskRequest {
        CreateTaskRequest {
            title: title.to_string(),
            due_date: Some(due_date.to_string()),
            priority: Some(priority.to_string()),
            ..Default::default()
        }
    }

    fn update_request(title: &str, completed: bool, category_id: Option<i64>) -> UpdateTaskRequest {
        UpdateTaskRequest {
            title: title.to_string(),
            description: Some("updated".to_string()),
            completed,
            due_date: "2024-07-01T12:00:00Z".to_string(),
            priority: "medium".to_string(),
            category_id,
        }
    }

    #[tokio::test]
    async fn test_create_task_defaults() {
        let (_db, service, alice, _bob) = setup().await;
        let before = Utc::now();

        let task = service
            .create_task(
                alice,
                CreateTaskRequest {
                    title: "Call mom".to_string(),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(!task.completed);
        assert_eq!(task.priority, TaskPriority::Low);
        assert!(task.due_date >= before);
        assert_eq!(task.created_at, task.updated_at);
        assert!(task.category.is_none());
    }

    #[tokio::test]
    async fn test_create_task_attaches_category() {
        let (db, service, alice, _bob) = setup().await;
        let category = CategoryRepository::create(&db, "Bills", alice).await.unwrap();

        let task = service
            .create_task(
                alice,
                CreateTaskRequest {
                    category_id: Some(category.id),
                    ..create_request("Pay rent", "2024-01-01T00:00:00Z", "high")
                },
            )
            .await
            .unwrap();

        assert_eq!(task.category, Some(category));
    }

    #[tokio::test]
    async fn test_create_task_rejects_foreign_category() {
        let (db, service, alice, bob) = setup().await;
        let bobs = CategoryRepository::create(&db, "Bob's", bob).await.unwrap();

        let err = service
            .create_task(
                alice,
                CreateTaskRequest {
                    category_id: Some(bobs.id),
                    ..create_request("Pay rent", "2024-01-01", "high")
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert!(service.list_tasks(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_task_rejects_bad_input() {
        let (_db, service, alice, _bob) = setup().await;

        let err = service
            .create_task(alice, create_request("x", "31/12/2024", "high"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let err = service
            .create_task(alice, create_request("x", "2024-12-31", "urgent"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        assert!(service.list_tasks(alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_date_only_round_trips_to_midnight() {
        let (_db, service, alice, _bob) = setup().await;
        service
            .create_task(alice, create_request("Trip", "2024-06-01", "low"))
            .await
            .unwrap();

        let tasks = service.list_tasks(alice).await.unwrap();
        assert_eq!(
            tasks[0].due_date,
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_list_tasks_ordering() {
        let (_db, service, alice, bob) = setup().await;
        let later = service
            .create_task(alice, create_request("later", "2024-06-05", "high"))
            .await
            .unwrap();
        let soon_low = service
            .create_task(alice, create_request("soon low", "2024-06-01", "low"))
            .await
            .unwrap();
        let soon_high = service
            .create_task(alice, create_request("soon high", "2024-06-01", "high"))
            .await
            .unwrap();
        let soon_high_newer = service
            .create_task(alice, create_request("soon high newer", "2024-06-01", "high"))
            .await
            .unwrap();
        service
            .create_task(bob, create_request("bob's", "2024-01-01", "high"))
            .await
            .unwrap();

        let ids: Vec<i64> = service
            .list_tasks(alice)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(
            ids,
            vec![soon_high_newer.id, soon_high.id, soon_low.id, later.id]
        );
    }

    #[tokio::test]
    async fn test_update_task_full_replace() {
        let (db, service, alice, _bob) = setup().await;
        let category = CategoryRepository::create(&db, "Home", alice).await.unwrap();
        let task = service
            .create_task(
                alice,
                CreateTaskRequest {
                    description: Some("original".to_string()),
                    ..create_request("Clean", "2024-06-01", "high")
                },
            )
            .await
            .unwrap();

        let updated = service
            .update_task(alice, task.id, update_request("Clean kitchen", true, Some(category.id)))
            .await
            .unwrap();

        assert_eq!(updated.title, "Clean kitchen");
        assert_eq!(updated.description.as_deref(), Some("updated"));
        assert!(updated.completed);
        assert_eq!(updated.priority, TaskPriority::Medium);
        assert_eq!(
            updated.due_date,
            Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(updated.category.map(|c| c.id), Some(category.id));
        assert!(updated.updated_at >= updated.created_at);
        assert_eq!(updated.created_at, task.created_at);
    }

    #[tokio::test]
    async fn test_update_task_scoped_to_owner() {
        let (_db, service, alice, bob) = setup().await;
        let task = service
            .create_task(alice, create_request("Mine", "2024-06-01", "high"))
            .await
            .unwrap();

        let err = service
            .update_task(bob, task.id, update_request("Stolen", false, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = service
            .update_task(alice, 9999, update_request("Ghost", false, None))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        assert_eq!(service.get_task(alice, task.id).await.unwrap().title, "Mine");
    }

    #[tokio::test]
    async fn test_delete_task_is_idempotent_and_scoped() {
        let (_db, service, alice, bob) = setup().await;
        let task = service
            .create_task(alice, create_request("Mine", "2024-06-01", "high"))
            .await
            .unwrap();

        service.delete_task(bob, task.id).await.unwrap();
        assert!(service.get_task(alice, task.id).await.is_ok());

        service.delete_task(alice, task.id).await.unwrap();
        service.delete_task(alice, task.id).await.unwrap();
        assert!(matches!(
            service.get_task(alice, task.id).await,
            Err(AppError::NotFound(_))
        ));
    }
}
