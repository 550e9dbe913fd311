//! Background job scheduler.
//!
//! Initialises a [`JobScheduler`] at server startup and registers the daily
//! `search_cache` retention job.

use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the background job scheduler.
///
/// Returns the running [`JobScheduler`] handle, which must be kept alive
/// for the lifetime of the process. Dropping it shuts down all jobs.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the scheduler cannot be initialised,
/// a job cannot be registered, or the scheduler fails to start.
pub async fn build_scheduler(
    pool: PgPool,
    retention_days: u32,
) -> Result<JobScheduler, JobSchedulerError> {
    let scheduler = JobScheduler::new().await?;

    register_cache_prune_job(&scheduler, pool, retention_days).await?;

    scheduler.start().await?;
    Ok(scheduler)
}

/// Register a daily `search_cache` prune at 03:30 UTC (`0 30 3 * * *`).
async fn register_cache_prune_job(
    scheduler: &JobScheduler,
    pool: PgPool,
    retention_days: u32,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async("0 30 3 * * *", move |_uuid, _lock| {
        let pool = pool.clone();

        Box::pin(async move {
            let cutoff = retention_cutoff(Utc::now(), retention_days);
            match parkon_db::prune_search_cache(&pool, cutoff).await {
                Ok(removed) => {
                    tracing::info!(removed, %cutoff, "scheduler: pruned search cache");
                }
                Err(e) => {
                    tracing::error!(error = %e, "scheduler: search cache prune failed");
                }
            }
        })
    })?;

    scheduler.add(job).await?;
    Ok(())
}

/// Entries cached before this instant are past retention.
pub fn retention_cutoff(now: DateTime<Utc>, retention_days: u32) -> DateTime<Utc> {
    now - Duration::days(i64::from(retention_days))
}
