//! In-memory implementation of every repository trait.
//!
//! All four tables live behind one `RwLock` so that cascades and batch inserts
//! are atomic, mirroring the constraints of the Postgres schema:
//! unique email, owner foreign keys, `ON DELETE CASCADE` from users and tasks,
//! and `ON DELETE SET NULL` from categories to tasks.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;

use crate::{
    category::{Category, CategoryRepository},
    error::{AppError, Result},
    notification::{NewNotification, Notification, NotificationRepository, SweepCandidate},
    task::{NewTask, Task, TaskChanges, TaskRepository},
    user::{User, UserId, UserRepository},
};

#[derive(Debug, Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<UserId, User>,
    categories: BTreeMap<i64, Category>,
    tasks: BTreeMap<i64, Task>,
    notifications: BTreeMap<i64, Notification>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn check_category_fk(&self, category_id: Option<i64>) -> Result<()> {
        match category_id {
            Some(id) if !self.categories.contains_key(&id) => Err(AppError::Validation(
                format!("Category {id} does not exist"),
            )),
            _ => Ok(()),
        }
    }

    fn with_category(&self, task: &Task) -> Task {
        let mut task = task.clone();
        task.category = task
            .category_id
            .and_then(|id| self.categories.get(&id).cloned());
        task
    }

    fn sorted_tasks<F>(&self, filter: F) -> Vec<Task>
    where
        F: Fn(&Task) -> bool,
    {
        let mut tasks: Vec<Task> = self
            .tasks
            .values()
            .filter(|t| filter(t))
            .map(|t| self.with_category(t))
            .collect();
        tasks.sort_by(Task::list_order);
        tasks
    }

    fn notified_since(&self, task_id: i64, threshold: DateTime<Utc>) -> bool {
        self.notifications
            .values()
            .any(|n| n.task_id == task_id && n.created_at > threshold)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDb {
    tables: Arc<RwLock<Tables>>,
}

impl MemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn create(&self, email: &str, password_hash: &str, name: &str) -> Result<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == email) {
            return Err(AppError::Conflict("User already exists".to_string()));
        }

        let user = User {
            id: UserId(tables.next_id()),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name: name.to_string(),
            created_at: Utc::now(),
        };
        tables.users.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.get(&id).cloned())
    }

    async fn delete(&self, id: UserId) -> Result<u64> {
        let mut tables = self.tables.write().await;
        if tables.users.remove(&id).is_none() {
            return Ok(0);
        }

        tables.notifications.retain(|_, n| n.user_id != id);
        tables.tasks.retain(|_, t| t.user_id != id);
        tables.categories.retain(|_, c| c.user_id != id);

        Ok(1)
    }
}

#[async_trait]
impl CategoryRepository for MemoryDb {
    async fn create(&self, name: &str, user_id: UserId) -> Result<Category> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(AppError::Storage(format!(
                "foreign key violation: user {user_id} does not exist"
            )));
        }

        let category = Category {
            id: tables.next_id(),
            name: name.to_string(),
            user_id,
            created_at: Utc::now(),
        };
        tables.categories.insert(category.id, category.clone());

        Ok(category)
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Category>> {
        let tables = self.tables.read().await;
        let mut categories: Vec<Category> = tables
            .categories
            .values()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();
        categories.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(categories)
    }

    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Category>> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .get(&id)
            .filter(|c| c.user_id == user_id)
            .cloned())
    }

    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .categories
            .get(&id)
            .is_some_and(|c| c.user_id == user_id);
        if !owned {
            return Ok(0);
        }

        tables.categories.remove(&id);
        for task in tables.tasks.values_mut() {
            if task.category_id == Some(id) {
                task.category_id = None;
            }
        }

        Ok(1)
    }
}

#[async_trait]
impl TaskRepository for MemoryDb {
    async fn create(&self, new: NewTask) -> Result<Task> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&new.user_id) {
            return Err(AppError::Storage(format!(
                "foreign key violation: user {} does not exist",
                new.user_id
            )));
        }
        tables.check_category_fk(new.category_id)?;

        let now = Utc::now();
        let task = Task {
            id: tables.next_id(),
            title: new.title,
            description: new.description,
            completed: false,
            user_id: new.user_id,
            category_id: new.category_id,
            due_date: new.due_date,
            priority: new.priority,
            created_at: now,
            updated_at: now,
            category: None,
        };
        tables.tasks.insert(task.id, task.clone());

        Ok(tables.with_category(&task))
    }

    async fn find_by_id(&self, id: i64, user_id: UserId) -> Result<Option<Task>> {
        let tables = self.tables.read().await;
        Ok(tables
            .tasks
            .get(&id)
            .filter(|t| t.user_id == user_id)
            .map(|t| tables.with_category(t)))
    }

    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_tasks(|t| t.user_id == user_id))
    }

    async fn find_by_category(&self, category_id: i64, user_id: UserId) -> Result<Vec<Task>> {
        let tables = self.tables.read().await;
        Ok(tables.sorted_tasks(|t| t.user_id == user_id && t.category_id == Some(category_id)))
    }

    async fn update(&self, id: i64, user_id: UserId, changes: TaskChanges) -> Result<Option<Task>> {
        let mut tables = self.tables.write().await;
        tables.check_category_fk(changes.category_id)?;

        let Some(task) = tables.tasks.get_mut(&id).filter(|t| t.user_id == user_id) else {
            return Ok(None);
        };

        task.title = changes.title;
        task.description = changes.description;
        task.completed = changes.completed;
        task.category_id = changes.category_id;
        task.due_date = changes.due_date;
        task.priority = changes.priority;
        task.updated_at = Utc::now().max(task.created_at);

        let task = task.clone();
        Ok(Some(tables.with_category(&task)))
    }

    async fn set_category(
        &self,
        id: i64,
        user_id: UserId,
        category_id: Option<i64>,
    ) -> Result<bool> {
        let mut tables = self.tables.write().await;
        tables.check_category_fk(category_id)?;

        match tables.tasks.get_mut(&id).filter(|t| t.user_id == user_id) {
            Some(task) => {
                task.category_id = category_id;
                task.updated_at = Utc::now().max(task.created_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64, user_id: UserId) -> Result<u64> {
        let mut tables = self.tables.write().await;
        let owned = tables.tasks.get(&id).is_some_and(|t| t.user_id == user_id);
        if !owned {
            return Ok(0);
        }

        tables.tasks.remove(&id);
        tables.notifications.retain(|_, n| n.task_id != id);

        Ok(1)
    }
}

#[async_trait]
impl NotificationRepository for MemoryDb {
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let tables = self.tables.read().await;
        let mut notifications: Vec<Notification> = tables
            .notifications
            .values()
            .filter(|n| n.user_id == user_id)
            .cloned()
            .collect();
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));

        Ok(notifications)
    }

    async fn mark_as_read(&self, id: i64, user_id: UserId) -> Result<Option<Notification>> {
        let mut tables = self.tables.write().await;
        Ok(tables
            .notifications
            .get_mut(&id)
            .filter(|n| n.user_id == user_id)
            .map(|n| {
                n.is_read = true;
                n.clone()
            }))
    }

    async fn find_sweep_candidates(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<SweepCandidate>> {
        let tables = self.tables.read().await;
        let threshold = now - cooldown;

        Ok(tables
            .tasks
            .values()
            .filter(|t| !t.completed && !tables.notified_since(t.id, threshold))
            .map(|t| SweepCandidate {
                task_id: t.id,
                user_id: t.user_id,
                title: t.title.clone(),
                due_date: t.due_date,
                previously_notified: tables.notifications.values().any(|n| n.task_id == t.id),
            })
            .collect())
    }

    async fn create_batch(
        &self,
        batch: &[NewNotification],
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<Notification>> {
        let mut tables = self.tables.write().await;
        let threshold = now - cooldown;
        let mut created = Vec::with_capacity(batch.len());

        for new in batch {
            let open = tables
                .tasks
                .get(&new.task_id)
                .is_some_and(|t| !t.completed);
            if !open || tables.notified_since(new.task_id, threshold) {
                continue;
            }

            let notification = Notification {
                id: tables.next_id(),
                user_id: new.user_id,
                task_id: new.task_id,
                message: new.message.clone(),
                is_read: false,
                created_at: now,
            };
            tables
                .notifications
                .insert(notification.id, notification.clone());
            created.push(notification);
        }

        Ok(created)
    }
}
