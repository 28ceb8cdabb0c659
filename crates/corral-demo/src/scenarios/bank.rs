//! Concurrent deposits and withdrawals against a guarded account, plus a
//! side-by-side run of the unguarded [`RacyAccount`].

use crate::config::DemoConfig;
use crate::scenarios::joined;
use crate::telemetry::increment_withdrawals_rejected;
use corral::{Account, AccountError, RacyAccount, TaskGroup};
use core::time::Duration;
use std::{sync::Arc, time::Instant};

/// Successful and rejected withdrawals of one scenario.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub succeeded: usize,
    pub rejected: usize,
}

impl Tally {
    fn from_outcomes(outcomes: &[bool]) -> Self {
        let succeeded = outcomes.iter().filter(|ok| **ok).count();
        Self {
            succeeded,
            rejected: outcomes.len() - succeeded,
        }
    }
}

pub async fn run(config: &DemoConfig) -> anyhow::Result<()> {
    basic_withdrawals().await?;
    mixed_transactions().await?;
    high_contention().await?;
    safe_versus_racy(config.race_delay).await?;
    stress().await?;
    simple().await?;
    Ok(())
}

fn withdraw(account: &Account, amount: i64) -> anyhow::Result<bool> {
    match account.withdraw(amount) {
        Ok(balance) => {
            tracing::info!("Withdrew {amount}, new balance: {balance}");
            Ok(true)
        }
        Err(AccountError::InsufficientFunds { available, .. }) => {
            increment_withdrawals_rejected();
            tracing::info!("Failed to withdraw {amount} (balance: {available} - insufficient funds)");
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

fn deposit(account: &Account, amount: i64) -> anyhow::Result<()> {
    let balance = account.deposit(amount)?;
    tracing::info!("Deposited {amount}, new balance: {balance}");
    Ok(())
}

/// Spawns `count` tasks that each withdraw `amount` from `account`.
fn spawn_withdrawals(
    group: &mut TaskGroup<anyhow::Result<bool>>,
    account: &Arc<Account>,
    count: usize,
    amount: i64,
) {
    for _ in 0..count {
        let account = Arc::clone(account);
        group.spawn(async move { withdraw(&account, amount) });
    }
}

/// Spawns `count` tasks that each deposit `amount` into `account`. Deposits
/// report `true` so they can share a group with withdrawals.
fn spawn_deposits(
    group: &mut TaskGroup<anyhow::Result<bool>>,
    account: &Arc<Account>,
    count: usize,
    amount: i64,
) {
    for _ in 0..count {
        let account = Arc::clone(account);
        group.spawn(async move { deposit(&account, amount).map(|()| true) });
    }
}

async fn settle(group: TaskGroup<anyhow::Result<bool>>) -> anyhow::Result<Vec<bool>> {
    joined(group.join_all().await)?.into_iter().collect()
}

/// Five concurrent withdrawals of 200 from 1000.
pub async fn basic_withdrawals() -> anyhow::Result<i64> {
    tracing::info!("--- Scenario 1: basic concurrent withdrawals ---");
    let account = Account::shared(1_000);
    let mut group = TaskGroup::with_capacity(5);
    spawn_withdrawals(&mut group, &account, 5, 200);
    settle(group).await?;

    let balance = account.balance();
    tracing::info!("Final balance: {balance} (expected: 0 or positive)");
    Ok(balance)
}

/// Five deposits of 100 racing eight withdrawals of 150, starting from 500.
pub async fn mixed_transactions() -> anyhow::Result<(i64, Tally)> {
    tracing::info!("--- Scenario 2: mixed deposits and withdrawals ---");
    let account = Account::shared(500);
    let mut deposits = TaskGroup::with_capacity(5);
    let mut withdrawals = TaskGroup::with_capacity(8);
    spawn_deposits(&mut deposits, &account, 5, 100);
    spawn_withdrawals(&mut withdrawals, &account, 8, 150);

    settle(deposits).await?;
    let tally = Tally::from_outcomes(&settle(withdrawals).await?);

    // 500 + 5 * 100 - successful * 150
    let balance = account.balance();
    tracing::info!("Final balance: {balance} (expected: >= 0)");
    Ok((balance, tally))
}

/// One hundred concurrent withdrawals of 100 from 5000.
pub async fn high_contention() -> anyhow::Result<(i64, Tally)> {
    tracing::info!("--- Scenario 3: high contention (100 concurrent withdrawals) ---");
    let account = Account::shared(5_000);
    let mut group = TaskGroup::with_capacity(100);
    spawn_withdrawals(&mut group, &account, 100, 100);
    let tally = Tally::from_outcomes(&settle(group).await?);

    let balance = account.balance();
    let expected = 5_000 - tally.succeeded as i64 * 100;
    tracing::info!("Successful withdrawals: {}", tally.succeeded);
    tracing::info!("Failed withdrawals: {}", tally.rejected);
    tracing::info!("Final balance: {balance}");
    tracing::info!(
        "Verification: 5000 - ({} * 100) = {expected}",
        tally.succeeded
    );

    if balance != expected {
        anyhow::bail!("balance {balance} does not match {expected}");
    }
    Ok((balance, tally))
}

/// Ten withdrawals of 200 from 1000, once on [`Account`] and once on
/// [`RacyAccount`]. Returns both final balances.
pub async fn safe_versus_racy(race_delay: Duration) -> anyhow::Result<(i64, i64)> {
    tracing::info!("--- Scenario 4: safe vs racy implementation ---");

    tracing::info!("Safe implementation (mutex):");
    let safe = Account::shared(1_000);
    let mut group = TaskGroup::with_capacity(10);
    spawn_withdrawals(&mut group, &safe, 10, 200);
    settle(group).await?;
    let safe_balance = safe.balance();
    tracing::info!("Final balance: {safe_balance} (should be >= 0)");

    tracing::info!("Racy implementation (no critical section):");
    let racy = Arc::new(RacyAccount::with_delay(1_000, race_delay));
    // The racy withdraw sleeps the calling thread between check and write.
    let mut group = TaskGroup::with_capacity(10);
    for _ in 0..10 {
        let racy = Arc::clone(&racy);
        group.spawn_blocking(move || racy.withdraw(200).is_ok());
    }
    joined(group.join_all().await)?;

    let racy_balance = racy.balance();
    if racy_balance < 0 {
        tracing::warn!("Final balance: {racy_balance} (negative: race condition occurred)");
    } else {
        tracing::warn!("Final balance: {racy_balance} (may look correct but is unsafe)");
    }

    Ok((safe_balance, racy_balance))
}

/// Five hundred deposits of 50 and five hundred withdrawals of 150 on
/// 100000.
pub async fn stress() -> anyhow::Result<i64> {
    tracing::info!("--- Scenario 5: stress test (1000 tasks) ---");
    let account = Account::shared(100_000);
    let start = Instant::now();

    let mut group = TaskGroup::with_capacity(1_000);
    spawn_deposits(&mut group, &account, 500, 50);
    spawn_withdrawals(&mut group, &account, 500, 150);
    settle(group).await?;

    let balance = account.balance();
    tracing::info!("Completed in: {:?}", start.elapsed());
    tracing::info!("Final balance: {balance} (should be >= 0)");
    Ok(balance)
}

/// Ten concurrent withdrawals of 150 from 1000.
pub async fn simple() -> anyhow::Result<i64> {
    tracing::info!("--- Simple example ---");
    let account = Account::shared(1_000);
    tracing::info!("Initial balance: 1000");
    tracing::info!("Starting 10 concurrent withdrawals of 150 each...");

    let mut group = TaskGroup::with_capacity(10);
    spawn_withdrawals(&mut group, &account, 10, 150);
    settle(group).await?;

    let balance = account.balance();
    tracing::info!("Final balance: {balance}");
    tracing::info!("Balance is correct and never went negative!");
    Ok(balance)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn basic_withdrawals_drain_the_account() -> anyhow::Result<()> {
        assert_eq!(basic_withdrawals().await?, 0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn mixed_transactions_balance_out() -> anyhow::Result<()> {
        let (balance, tally) = mixed_transactions().await?;
        assert!(balance >= 0);
        assert_eq!(balance, 1_000 - tally.succeeded as i64 * 150);
        assert_eq!(tally.succeeded + tally.rejected, 8);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn high_contention_splits_evenly() -> anyhow::Result<()> {
        let (balance, tally) = high_contention().await?;
        assert_eq!(balance, 0);
        assert_eq!(
            tally,
            Tally {
                succeeded: 50,
                rejected: 50
            }
        );
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn safe_account_never_overdraws() -> anyhow::Result<()> {
        let (safe, racy) = safe_versus_racy(Duration::ZERO).await?;
        assert_eq!(safe, 0);
        // The racy balance depends on scheduling; it is never above the
        // correct one.
        assert!(racy <= 0);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn stress_lands_on_the_exact_balance() -> anyhow::Result<()> {
        // Deposits and withdrawals are both fully covered by 100_000.
        assert_eq!(stress().await?, 50_000);
        Ok(())
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn simple_example_stops_at_100() -> anyhow::Result<()> {
        assert_eq!(simple().await?, 100);
        Ok(())
    }
}
