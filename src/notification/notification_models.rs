use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::user::UserId;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Notification {
    pub id: i64,
    pub user_id: UserId,
    pub task_id: i64,
    pub message: String,
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewNotification {
    pub user_id: UserId,
    pub task_id: i64,
    pub message: String,
}

/// An incomplete task outside its notification cooldown.
#[derive(Debug, Clone, FromRow)]
pub struct SweepCandidate {
    pub task_id: i64,
    pub user_id: UserId,
    pub title: String,
    pub due_date: DateTime<Utc>,
    /// Whether the task has ever had a notification.
    pub previously_notified: bool,
}
