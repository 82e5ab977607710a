//! Background refresh scheduler.
//!
//! When `LIVEWALL_REFRESH_CRON` is set, a [`JobScheduler`] drives
//! [`Aggregator::refresh`] with the configured default query and limit so
//! `/api/live` stays warm without anyone calling `/api/fetch-live`.

use std::sync::Arc;

use livewall_aggregator::Aggregator;
use livewall_core::AppConfig;
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};

/// Builds and starts the refresh scheduler.
///
/// Returns `Ok(None)` when no cron expression is configured. Otherwise the
/// returned handle must be kept alive for the lifetime of the process;
/// dropping it stops the job.
///
/// # Errors
///
/// Returns [`JobSchedulerError`] if the cron expression does not parse, or
/// the scheduler cannot be initialised or started.
pub async fn build_scheduler(
    aggregator: Arc<Aggregator>,
    config: Arc<AppConfig>,
) -> Result<Option<JobScheduler>, JobSchedulerError> {
    let Some(cron) = config.refresh_cron.clone() else {
        tracing::info!("scheduler: LIVEWALL_REFRESH_CRON not set; scheduled refresh disabled");
        return Ok(None);
    };

    let scheduler = JobScheduler::new().await?;
    register_refresh_job(&scheduler, &cron, aggregator, config).await?;
    scheduler.start().await?;
    Ok(Some(scheduler))
}

async fn register_refresh_job(
    scheduler: &JobScheduler,
    cron: &str,
    aggregator: Arc<Aggregator>,
    config: Arc<AppConfig>,
) -> Result<(), JobSchedulerError> {
    let job = Job::new_async(cron, move |_uuid, _lock| {
        let aggregator = Arc::clone(&aggregator);
        let config = Arc::clone(&config);

        Box::pin(async move {
            tracing::info!("scheduler: starting live refresh");
            run_refresh_job(&aggregator, &config).await;
        })
    })?;

    scheduler.add(job).await?;
    tracing::info!(cron = %cron, "scheduler: registered live refresh job");
    Ok(())
}

async fn run_refresh_job(aggregator: &Aggregator, config: &AppConfig) {
    let report = aggregator
        .refresh(&config.default_query, config.default_limit)
        .await;

    if report.no_platforms() {
        tracing::warn!("scheduler: no platforms configured; nothing refreshed");
    } else if report.all_failed() {
        tracing::error!(
            failures = %report.failure_summary(),
            "scheduler: every platform failed"
        );
    } else {
        tracing::info!(
            items = report.snapshot.all.len(),
            failed = report.failures.len(),
            persisted = report.persisted,
            "scheduler: live refresh complete"
        );
    }
}
