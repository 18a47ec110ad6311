use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;

use super::notification_models::{NewNotification, Notification, SweepCandidate};
use crate::{error::Result, user::UserId};

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Newest first.
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Notification>>;

    /// Sets the read flag. `None` when no notification with `id` belongs to `user_id`.
    async fn mark_as_read(&self, id: i64, user_id: UserId) -> Result<Option<Notification>>;

    /// Incomplete tasks without a notification created after `now - cooldown`.
    async fn find_sweep_candidates(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<SweepCandidate>>;

    /// Inserts the batch atomically with `created_at = now`.
    ///
    /// The cooldown and completion checks are repeated per row at insert time;
    /// rows failing them are skipped. Returns the rows actually created.
    async fn create_batch(
        &self,
        batch: &[NewNotification],
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<Notification>>;
}

#[derive(Clone)]
pub struct PgNotificationRepository {
    pool: PgPool,
}

impl PgNotificationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationRepository for PgNotificationRepository {
    async fn find_all_by_user(&self, user_id: UserId) -> Result<Vec<Notification>> {
        let notifications = sqlx::query_as::<_, Notification>(
            "SELECT * FROM notifications WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(notifications)
    }

    async fn mark_as_read(&self, id: i64, user_id: UserId) -> Result<Option<Notification>> {
        let notification = sqlx::query_as::<_, Notification>(
            "UPDATE notifications SET is_read = true WHERE id = $1 AND user_id = $2 RETURNING *",
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn find_sweep_candidates(
        &self,
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<SweepCandidate>> {
        let candidates = sqlx::query_as::<_, SweepCandidate>(
            "SELECT t.id AS task_id, t.user_id, t.title, t.due_date,
                    EXISTS (SELECT 1 FROM notifications n WHERE n.task_id = t.id)
                        AS previously_notified
             FROM tasks t
             WHERE t.completed = false
               AND NOT EXISTS (
                   SELECT 1 FROM notifications n
                   WHERE n.task_id = t.id AND n.created_at > $1
               )
             ORDER BY t.id",
        )
        .bind(now - cooldown)
        .fetch_all(&self.pool)
        .await?;

        Ok(candidates)
    }

    async fn create_batch(
        &self,
        batch: &[NewNotification],
        now: DateTime<Utc>,
        cooldown: Duration,
    ) -> Result<Vec<Notification>> {
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(batch.len());

        for new in batch {
            let notification = sqlx::query_as::<_, Notification>(
                "INSERT INTO notifications (user_id, task_id, message, created_at)
                 SELECT $1, $2, $3, $4
                 WHERE EXISTS (SELECT 1 FROM tasks WHERE id = $2 AND completed = false)
                   AND NOT EXISTS (
                       SELECT 1 FROM notifications WHERE task_id = $2 AND created_at > $5
                   )
                 RETURNING *",
            )
            .bind(new.user_id)
            .bind(new.task_id)
            .bind(&new.message)
            .bind(now)
            .bind(now - cooldown)
            .fetch_optional(&mut *tx)
            .await?;

            if let Some(notification) = notification {
                created.push(notification);
            }
        }

        tx.commit().await?;

        Ok(created)
    }
}
