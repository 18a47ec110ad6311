use std::cmp::Ordering;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::{category::Category, error::AppError, user::UserId};

/// Ordered task priority, persisted as a small integer (`Low = 0`).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    sqlx::Type,
    ToSchema,
)]
#[repr(i32)]
pub enum TaskPriority {
    #[default]
    Low = 0,
    Medium = 1,
    High = 2,
}

impl std::fmt::Display for TaskPriority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskPriority::Low => write!(f, "Low"),
            TaskPriority::Medium => write!(f, "Medium"),
            TaskPriority::High => write!(f, "High"),
        }
    }
}

impl FromStr for TaskPriority {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(TaskPriority::Low),
            "medium" => Ok(TaskPriority::Medium),
            "high" => Ok(TaskPriority::High),
            other => Err(AppError::Validation(format!("Invalid priority: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: UserId,
    pub category_id: Option<i64>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub category: Option<Category>,
}

impl Task {
    /// Listing order: soonest due first, then higher priority, then newest.
    pub fn list_order(a: &Task, b: &Task) -> Ordering {
        a.due_date
            .cmp(&b.due_date)
            .then_with(|| b.priority.cmp(&a.priority))
            .then_with(|| b.created_at.cmp(&a.created_at))
            .then_with(|| b.id.cmp(&a.id))
    }
}

/// A task row joined with its (optional) category.
#[derive(Debug, FromRow)]
pub struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub user_id: UserId,
    pub category_id: Option<i64>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub category_name: Option<String>,
    pub category_created_at: Option<DateTime<Utc>>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        let category = match (row.category_id, row.category_name, row.category_created_at) {
            (Some(id), Some(name), Some(created_at)) => Some(Category {
                id,
                name,
                user_id: row.user_id,
                created_at,
            }),
            _ => None,
        };

        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            user_id: row.user_id,
            category_id: row.category_id,
            due_date: row.due_date,
            priority: row.priority,
            created_at: row.created_at,
            updated_at: row.updated_at,
            category,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub user_id: UserId,
    pub category_id: Option<i64>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
}

/// Full replacement of a task's mutable fields.
#[derive(Debug, Clone)]
pub struct TaskChanges {
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub category_id: Option<i64>,
    pub due_date: DateTime<Utc>,
    pub priority: TaskPriority,
}
