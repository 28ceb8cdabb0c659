//! Worker pool whose doubled job ids flow back through a result sink.

use crate::config::DemoConfig;
use crate::telemetry::increment_jobs_processed;
use core::convert::Infallible;
use corral::{PoolConfig, WorkQueue, WorkerPool};

pub async fn run(config: &DemoConfig) -> anyhow::Result<Vec<usize>> {
    let capacity = config.num_jobs.max(1);
    let pool = WorkerPool::new(
        PoolConfig::new(config.num_workers)
            .with_queue_capacity(capacity)
            .with_result_capacity(capacity),
    )?;
    let queue = WorkQueue::bounded(capacity)?;
    let delay = config.work_delay;

    let fan_in = pool.start_fan_in(&queue, move |_, job: usize| async move {
        tokio::time::sleep(delay).await;
        Ok::<_, Infallible>(job * 2)
    })?;

    let producer = {
        let queue = queue.clone();
        let jobs = config.num_jobs;
        tokio::spawn(async move {
            for job in 1..=jobs {
                queue.push(job).await?;
            }
            queue.close()
        })
    };

    tracing::info!("Collecting results:");
    let mut received = Vec::with_capacity(config.num_jobs);
    while let Some(result) = fan_in.recv().await {
        tracing::info!("Result received: {result}");
        received.push(result);
    }

    producer.await??;
    let report = fan_in.finish().await?.into_result()?;
    increment_jobs_processed(report.processed() as u64);
    tracing::info!("All jobs completed!");

    Ok(received)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scenario;
    use core::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn every_doubled_id_is_received() -> anyhow::Result<()> {
        let config = DemoConfig {
            scenario: Scenario::FanIn,
            num_workers: 3,
            num_jobs: 10,
            work_delay: Duration::from_millis(1),
            counter_tasks: 1,
            race_delay: Duration::ZERO,
        };

        let mut received = run(&config).await?;
        received.sort_unstable();
        assert_eq!(received, (1..=10).map(|j| j * 2).collect::<Vec<_>>());
        Ok(())
    }
}
