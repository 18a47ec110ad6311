use std::time::Duration;

use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, error, info};

use super::notification_service::NotificationService;

pub const DEFAULT_SWEEP_INTERVAL_MINUTES: u64 = 15;

/// Starts the recurring due-task sweep.
///
/// A failed sweep is logged and the next tick runs as scheduled.
/// Keep the returned scheduler alive for as long as sweeps should run.
pub async fn start_notification_scheduler(
    service: NotificationService,
    interval: Duration,
) -> anyhow::Result<JobScheduler> {
    let scheduler = JobScheduler::new().await?;

    let job = Job::new_repeated_async(interval, move |_uuid, _l| {
        let service = service.clone();

        Box::pin(async move {
            match service.run_sweep().await {
                Ok(created) if created.is_empty() => debug!("No due-task notifications this tick"),
                Ok(created) => info!("Created {} due-task notifications", created.len()),
                Err(e) => error!("Error checking due tasks: {:?}", e),
            }
        })
    })?;

    scheduler.add(job).await?;
    scheduler.start().await?;

    info!(interval_secs = interval.as_secs(), "Notification scheduler started");
    Ok(scheduler)
}
