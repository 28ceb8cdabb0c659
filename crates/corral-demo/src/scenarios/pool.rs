//! Numbered jobs drained by a fixed pool of workers.

use crate::config::DemoConfig;
use crate::telemetry::{increment_jobs_processed, increment_task_failures};
use core::convert::Infallible;
use corral::{JobRunner, PoolReport};

pub async fn run(config: &DemoConfig) -> anyhow::Result<PoolReport> {
    let runner = JobRunner::new(config.num_workers, config.num_jobs)?;
    let delay = config.work_delay;

    tracing::info!(
        "Starting {} workers on {} jobs",
        config.num_workers,
        config.num_jobs
    );

    let report = runner
        .run(move |worker, job| async move {
            tracing::info!("Worker {worker} processing job {job}");
            tokio::time::sleep(delay).await;
            Ok::<_, Infallible>(())
        })
        .await?;

    increment_jobs_processed(report.processed() as u64);
    increment_task_failures(report.failed() as u64);
    tracing::info!("All jobs completed!");

    Ok(report)
}
