pub mod bank;
pub mod counter;
pub mod fan_in;
pub mod pool;

use crate::config::{DemoConfig, Scenario};
use crate::telemetry::record_scenario_duration;
use core::future::Future;
use std::time::Instant;
use tokio::task::JoinError;
use tracing::Instrument;

/// Runs every scenario selected by `config`, in a fixed order.
pub async fn run(config: &DemoConfig) -> anyhow::Result<()> {
    if config.runs(Scenario::Pool) {
        timed("pool", pool::run(config)).await?;
    }
    if config.runs(Scenario::FanIn) {
        timed("fan-in", fan_in::run(config)).await?;
    }
    if config.runs(Scenario::Counter) {
        timed("counter", counter::run(config)).await?;
    }
    if config.runs(Scenario::Bank) {
        timed("bank", bank::run(config)).await?;
    }
    Ok(())
}

async fn timed<T>(
    name: &'static str,
    scenario: impl Future<Output = anyhow::Result<T>>,
) -> anyhow::Result<T> {
    tracing::info!("=== {name} ===");

    let start = Instant::now();
    let outcome = scenario
        .instrument(tracing::info_span!("scenario", name))
        .await;
    let elapsed = start.elapsed();

    record_scenario_duration(name, elapsed.as_secs_f64() * 1_000.0);
    match &outcome {
        Ok(_) => tracing::info!("{name} finished in {elapsed:?}"),
        Err(e) => tracing::error!("{name} failed after {elapsed:?}: {e:#}"),
    }
    outcome
}

/// Unwraps the per-task results of a `TaskGroup`, failing on the first task
/// that panicked or was cancelled.
pub(crate) fn joined<T>(results: Vec<Result<T, JoinError>>) -> anyhow::Result<Vec<T>> {
    Ok(results.into_iter().collect::<Result<Vec<_>, _>>()?)
}
