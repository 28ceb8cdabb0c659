use anyhow::bail;
use clap::{Parser, ValueEnum};
use core::time::Duration;

/// Which demonstration to run.
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    /// Worker pool draining numbered jobs.
    Pool,
    /// Worker pool whose results are gathered through a fan-in sink.
    FanIn,
    /// Concurrent increments of a guarded counter.
    Counter,
    /// Concurrent deposits and withdrawals on a guarded account.
    Bank,
    /// Every scenario above, in order.
    All,
}

/// Runtime configuration for the `corral-demo` binary.
///
/// All values are parsed from CLI arguments or environment variables (a
/// `.env` file is loaded first), with defaults that reproduce the classic
/// "3 workers, 10 jobs, 1 second each" walkthrough.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "corral-demo",
    version,
    about = "Worker pool, fan-in and guarded state demonstrations"
)]
pub struct CliArgs {
    /// Scenario to run.
    #[arg(value_enum, default_value_t = Scenario::All)]
    pub scenario: Scenario,

    /// Number of concurrent workers in the pool scenarios.
    ///
    /// Environment variable: `NUM_WORKERS`
    #[arg(long, env = "NUM_WORKERS", default_value_t = 3)]
    pub num_workers: usize,

    /// Number of jobs (ids `1..=NUM_JOBS`) fed to the pool.
    ///
    /// Environment variable: `NUM_JOBS`
    #[arg(long, env = "NUM_JOBS", default_value_t = 10)]
    pub num_jobs: usize,

    /// Simulated work per job, in milliseconds.
    ///
    /// Environment variable: `WORK_DELAY_MS`
    #[arg(long, env = "WORK_DELAY_MS", default_value_t = 1_000)]
    pub work_delay_ms: u64,

    /// Number of concurrent tasks in the counter scenario.
    ///
    /// Environment variable: `COUNTER_TASKS`
    #[arg(long, env = "COUNTER_TASKS", default_value_t = 1_000)]
    pub counter_tasks: usize,

    /// Pause between check and write in the racy account, in microseconds.
    ///
    /// Larger values make the overdraft in bank scenario 4 more likely.
    ///
    /// Environment variable: `RACE_DELAY_US`
    #[arg(long, env = "RACE_DELAY_US", default_value_t = 1_000)]
    pub race_delay_us: u64,
}

#[derive(Debug, Clone)]
pub struct DemoConfig {
    pub scenario: Scenario,
    pub num_workers: usize,
    pub num_jobs: usize,
    pub work_delay: Duration,
    pub counter_tasks: usize,
    pub race_delay: Duration,
}

impl DemoConfig {
    /// Whether `scenario` is selected, either directly or through `all`.
    pub fn runs(&self, scenario: Scenario) -> bool {
        self.scenario == Scenario::All || self.scenario == scenario
    }
}

impl TryFrom<CliArgs> for DemoConfig {
    type Error = anyhow::Error;

    fn try_from(args: CliArgs) -> Result<Self, Self::Error> {
        if args.num_workers == 0 {
            bail!("NUM_WORKERS must be greater than 0");
        }

        if args.counter_tasks == 0 {
            bail!("COUNTER_TASKS must be greater than 0");
        }

        Ok(Self {
            scenario: args.scenario,
            num_workers: args.num_workers,
            num_jobs: args.num_jobs,
            work_delay: Duration::from_millis(args.work_delay_ms),
            counter_tasks: args.counter_tasks,
            race_delay: Duration::from_micros(args.race_delay_us),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> anyhow::Result<DemoConfig> {
        let args = CliArgs::try_parse_from(core::iter::once("corral-demo").chain(args.iter().copied()))?;
        DemoConfig::try_from(args)
    }

    #[test]
    fn explicit_flags_are_converted() {
        let config = parse(&[
            "bank",
            "--num-workers",
            "4",
            "--num-jobs",
            "20",
            "--work-delay-ms",
            "5",
            "--counter-tasks",
            "10",
            "--race-delay-us",
            "250",
        ])
        .unwrap();

        assert_eq!(config.scenario, Scenario::Bank);
        assert_eq!(config.num_workers, 4);
        assert_eq!(config.num_jobs, 20);
        assert_eq!(config.work_delay, Duration::from_millis(5));
        assert_eq!(config.counter_tasks, 10);
        assert_eq!(config.race_delay, Duration::from_micros(250));
        assert!(config.runs(Scenario::Bank));
        assert!(!config.runs(Scenario::Pool));
    }

    #[test]
    fn fan_in_is_kebab_case() {
        let config = parse(&["fan-in", "--num-workers", "1", "--counter-tasks", "1"]).unwrap();
        assert_eq!(config.scenario, Scenario::FanIn);
    }

    #[test]
    fn all_runs_everything() {
        let config = parse(&["all", "--num-workers", "2", "--counter-tasks", "1"]).unwrap();
        assert!(config.runs(Scenario::Pool));
        assert!(config.runs(Scenario::Counter));
    }

    #[test]
    fn zero_workers_is_rejected() {
        let err = parse(&["pool", "--num-workers", "0", "--counter-tasks", "1"]).unwrap_err();
        assert!(err.to_string().contains("NUM_WORKERS"));
    }

    #[test]
    fn zero_counter_tasks_is_rejected() {
        let err = parse(&["counter", "--num-workers", "1", "--counter-tasks", "0"]).unwrap_err();
        assert!(err.to_string().contains("COUNTER_TASKS"));
    }
}
