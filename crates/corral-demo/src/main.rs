#![doc = include_str!("../README.md")]

mod config;
mod scenarios;
mod telemetry;

use clap::Parser;
use config::{CliArgs, DemoConfig};
use telemetry::init_telemetry;

// Using mimalloc for better performance under contention, especially in musl
// environments.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();
    let config = DemoConfig::try_from(args)?;

    let providers = init_telemetry()?;
    log_startup_info(&config);

    let outcome = scenarios::run(&config).await;

    providers.shutdown();
    outcome
}

fn log_startup_info(config: &DemoConfig) {
    if cfg!(debug_assertions) {
        tracing::info!("Starting corral demo with full config: {config:#?}");
    } else {
        tracing::info!(
            "Starting corral demo ({:?}) with {} workers",
            config.scenario,
            config.num_workers
        );
    }
}
