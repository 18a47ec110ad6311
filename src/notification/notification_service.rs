use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::broadcast;
use tracing::{debug, info};

use super::{
    notification_models::{NewNotification, Notification, SweepCandidate},
    notification_repository::NotificationRepository,
};
use crate::{
    error::{AppError, Result},
    user::UserId,
};

/// Minimum spacing between two notifications for the same task.
pub const NOTIFICATION_COOLDOWN_MINUTES: i64 = 60;

pub fn notification_cooldown() -> Duration {
    Duration::minutes(NOTIFICATION_COOLDOWN_MINUTES)
}

/// Why a task is being notified. Variants are listed in precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Overdue,
    DueToday,
    DueSoon,
    New,
}

impl NotificationKind {
    /// The first matching kind wins; `None` means the task is not worth a notification.
    pub fn classify(
        due_date: DateTime<Utc>,
        now: DateTime<Utc>,
        previously_notified: bool,
    ) -> Option<Self> {
        if due_date < now {
            Some(NotificationKind::Overdue)
        } else if due_date < now + Duration::days(1) {
            Some(NotificationKind::DueToday)
        } else if due_date < now + Duration::days(3) {
            Some(NotificationKind::DueSoon)
        } else if !previously_notified {
            Some(NotificationKind::New)
        } else {
            None
        }
    }

    pub fn message(self, title: &str) -> String {
        match self {
            NotificationKind::Overdue => format!("Task overdue: {title}"),
            NotificationKind::DueToday => format!("Task due today: {title}"),
            NotificationKind::DueSoon => format!("Less than 3 days left for task: {title}"),
            NotificationKind::New => format!("New task created: {title}"),
        }
    }
}

fn plan_notifications(candidates: &[SweepCandidate], now: DateTime<Utc>) -> Vec<NewNotification> {
    candidates
        .iter()
        .filter_map(|candidate| {
            let kind = NotificationKind::classify(
                candidate.due_date,
                now,
                candidate.previously_notified,
            )?;
            Some(NewNotification {
                user_id: candidate.user_id,
                task_id: candidate.task_id,
                message: kind.message(&candidate.title),
            })
        })
        .collect()
}

/// Notification engine: due-task sweeps, read tracking and live fan-out.
#[derive(Clone)]
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    notification_tx: broadcast::Sender<Notification>,
}

impl NotificationService {
    pub fn new(repo: Arc<dyn NotificationRepository>) -> Self {
        let (notification_tx, _) = broadcast::channel(100);
        Self {
            repo,
            notification_tx,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notification_tx.subscribe()
    }

    pub async fn list_notifications(&self, user_id: UserId) -> Result<Vec<Notification>> {
        self.repo.find_all_by_user(user_id).await
    }

    /// Marking an already read notification again is a no-op success.
    pub async fn mark_as_read(&self, user_id: UserId, notification_id: i64) -> Result<Notification> {
        self.repo
            .mark_as_read(notification_id, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Notification not found".to_string()))
    }

    pub async fn run_sweep(&self) -> Result<Vec<Notification>> {
        self.run_sweep_at(Utc::now()).await
    }

    /// Creates at most one notification per eligible task, evaluated at `now`.
    ///
    /// Tasks notified within the last [`NOTIFICATION_COOLDOWN_MINUTES`] are
    /// skipped, so repeated sweeps inside the window create nothing new.
    /// Concurrent sweeps are de-duplicated only as far as the store's per-row
    /// re-check allows.
    pub async fn run_sweep_at(&self, now: DateTime<Utc>) -> Result<Vec<Notification>> {
        let candidates = self
            .repo
            .find_sweep_candidates(now, notification_cooldown())
            .await?;
        let batch = plan_notifications(&candidates, now);
        if batch.is_empty() {
            debug!(candidates = candidates.len(), "Due-task sweep found nothing to notify");
            return Ok(Vec::new());
        }

        let created = self
            .repo
            .create_batch(&batch, now, notification_cooldown())
            .await?;

        for notification in &created {
            let _ = self.notification_tx.send(notification.clone());
        }

        info!(
            candidates = candidates.len(),
            created = created.len(),
            "Due-task sweep finished"
        );
        Ok(created)
    }
}
