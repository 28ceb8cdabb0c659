use crate::config::DemoConfig;
use crate::scenarios::joined;
use corral::{Counter, TaskGroup};
use std::sync::Arc;

/// Increments one shared counter from `counter_tasks` concurrent tasks and
/// returns the final count.
pub async fn run(config: &DemoConfig) -> anyhow::Result<u64> {
    let counter = Arc::new(Counter::new());
    let mut group = TaskGroup::with_capacity(config.counter_tasks);

    for _ in 0..config.counter_tasks {
        let counter = Arc::clone(&counter);
        group.spawn(async move {
            counter.increment();
        });
    }
    joined(group.join_all().await)?;

    let expected = config.counter_tasks as u64;
    let actual = counter.value();
    tracing::info!("Expected: {expected}, Got: {actual}");

    if actual != expected {
        anyhow::bail!("race condition detected: expected {expected}, got {actual}");
    }
    tracing::info!("No race condition - counter is accurate!");

    Ok(actual)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Scenario;
    use core::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn counts_every_task() -> anyhow::Result<()> {
        let config = DemoConfig {
            scenario: Scenario::Counter,
            num_workers: 1,
            num_jobs: 0,
            work_delay: Duration::ZERO,
            counter_tasks: 1_000,
            race_delay: Duration::ZERO,
        };

        assert_eq!(run(&config).await?, 1_000);
        Ok(())
    }
}
