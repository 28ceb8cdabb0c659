use crate::{Account, AccountError, Counter, Ledger, RacyAccount, TaskGroup};
use core::time::Duration;
use std::sync::{
    Arc, Barrier,
    atomic::{AtomicUsize, Ordering},
};
use std::thread::scope;

/// Runs `threads` withdrawals of `amount` at once and returns how many
/// succeeded.
fn withdraw_concurrently<L: Ledger>(ledger: &L, threads: usize, amount: i64) -> usize {
    let barrier = Barrier::new(threads);
    let successes = AtomicUsize::new(0);

    scope(|s| {
        for _ in 0..threads {
            s.spawn(|| {
                barrier.wait();
                if ledger.withdraw(amount).is_ok() {
                    successes.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    successes.into_inner()
}

fn run_withdraw_rejects_overdraft<L: Ledger>(ledger: &L) {
    assert_eq!(ledger.balance(), 100);
    assert_eq!(
        ledger.withdraw(150),
        Err(AccountError::InsufficientFunds {
            requested: 150,
            available: 100
        })
    );
    assert_eq!(ledger.balance(), 100, "a rejected withdrawal changed the balance");
    assert_eq!(ledger.withdraw(100), Ok(0));
    assert!(ledger.withdraw(1).is_err());
}

fn run_deposit_then_withdraw<L: Ledger>(ledger: &L) {
    assert_eq!(ledger.deposit(50), Ok(150));
    assert_eq!(ledger.withdraw(30), Ok(120));
    assert_eq!(ledger.balance(), 120);
}

fn run_rejects_non_positive_amounts<L: Ledger>(ledger: &L) {
    assert_eq!(
        ledger.deposit(0),
        Err(AccountError::InvalidAmount { amount: 0 })
    );
    assert_eq!(
        ledger.withdraw(-5),
        Err(AccountError::InvalidAmount { amount: -5 })
    );
    assert_eq!(ledger.balance(), 100);
}

#[test]
fn account_withdraw_rejects_overdraft() {
    run_withdraw_rejects_overdraft(&Account::new(100));
}

#[test]
fn racy_withdraw_rejects_overdraft_without_contention() {
    run_withdraw_rejects_overdraft(&RacyAccount::new(100));
}

#[test]
fn account_deposit_then_withdraw() {
    run_deposit_then_withdraw(&Account::new(100));
}

#[test]
fn racy_deposit_then_withdraw() {
    run_deposit_then_withdraw(&RacyAccount::new(100));
}

#[test]
fn account_rejects_non_positive_amounts() {
    run_rejects_non_positive_amounts(&Account::new(100));
}

#[test]
fn racy_rejects_non_positive_amounts() {
    run_rejects_non_positive_amounts(&RacyAccount::new(100));
}

#[test]
fn account_deposit_overflow_is_rejected() {
    let account = Account::new(i64::MAX - 1);
    assert_eq!(account.deposit(2), Err(AccountError::Overflow));
    assert_eq!(account.balance(), i64::MAX - 1);
}

#[test]
fn racy_deposit_overflow_is_rejected() {
    let account = RacyAccount::new(i64::MAX - 1);
    assert_eq!(account.deposit(2), Err(AccountError::Overflow));
    assert_eq!(account.balance(), i64::MAX - 1);
    assert_eq!(account.deposit(1), Ok(i64::MAX));
}

#[test]
fn racy_withdraw_wraps_past_the_minimum_without_panicking() {
    // Every racer sees i64::MAX at check time, so the third subtraction
    // would step below i64::MIN.
    let account = RacyAccount::with_delay(i64::MAX, Duration::from_millis(20));
    let successes = withdraw_concurrently(&account, 4, i64::MAX);
    assert!(successes >= 1);
}

#[test]
fn account_high_contention_never_goes_negative() {
    let account = Account::shared(5_000);
    let successes = withdraw_concurrently(&*account, 100, 100);

    assert_eq!(successes, 50);
    assert_eq!(account.balance(), 0);
}

#[test]
fn account_balance_matches_successful_withdrawals() {
    for _ in 0..20 {
        let account = Account::new(1_000);
        let successes = withdraw_concurrently(&account, 10, 150);

        let balance = account.balance();
        assert!(balance >= 0);
        assert_eq!(balance, 1_000 - successes as i64 * 150);
        assert_eq!(successes, 6);
    }
}

#[test]
fn account_mixed_deposits_and_withdrawals_stay_consistent() {
    let account = Account::shared(500);
    let barrier = Barrier::new(13);
    let successes = AtomicUsize::new(0);

    scope(|s| {
        for _ in 0..5 {
            s.spawn(|| {
                barrier.wait();
                account.deposit(100).unwrap();
            });
        }
        for _ in 0..8 {
            s.spawn(|| {
                barrier.wait();
                if account.withdraw(150).is_ok() {
                    successes.fetch_add(1, Ordering::Relaxed);
                }
            });
        }
    });

    let successes = successes.into_inner() as i64;
    let balance = account.balance();
    assert!(balance >= 0);
    assert_eq!(balance, 1_000 - successes * 150);
    // 500 up front covers at least three withdrawals in any interleaving.
    assert!(successes >= 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn account_shared_across_tasks() {
    let account = Account::shared(100_000);
    let mut group = TaskGroup::with_capacity(1_000);

    for _ in 0..500 {
        let account = Arc::clone(&account);
        group.spawn(async move { account.deposit(50).is_ok() });
    }
    for _ in 0..500 {
        let account = Arc::clone(&account);
        group.spawn(async move { account.withdraw(150).is_ok() });
    }

    let outcomes = group.join_all().await;
    assert!(outcomes.iter().all(|o| *o.as_ref().unwrap()));
    // 100_000 + 500 * 50 - 500 * 150
    assert_eq!(account.balance(), 50_000);
}

#[test]
fn racy_account_can_go_negative() {
    // Each attempt lines ten threads up on a barrier so they all read the
    // balance before any of them writes. The delay keeps the window open.
    let went_negative = (0..20).any(|_| {
        let account = RacyAccount::with_delay(1_000, Duration::from_millis(5));
        withdraw_concurrently(&account, 10, 200);
        account.balance() < 0
    });

    assert!(went_negative, "expected the unguarded account to overdraw");
}

#[test]
fn guarded_account_survives_the_racy_workload() {
    for _ in 0..20 {
        let account = Account::new(1_000);
        let successes = withdraw_concurrently(&account, 10, 200);
        assert_eq!(successes, 5);
        assert_eq!(account.balance(), 0);
    }
}

#[test]
fn counter_counts_every_threaded_increment() {
    let counter = Counter::new();

    scope(|s| {
        for _ in 0..8 {
            s.spawn(|| {
                for _ in 0..1_000 {
                    counter.increment();
                }
            });
        }
    });

    assert_eq!(counter.value(), 8_000);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn counter_counts_every_task_increment() {
    for _ in 0..5 {
        let counter = Arc::new(Counter::default());
        let mut group = TaskGroup::with_capacity(1_000);

        for _ in 0..1_000 {
            let counter = Arc::clone(&counter);
            group.spawn(async move {
                counter.increment();
            });
        }

        let joined = group.join_all().await;
        assert!(joined.iter().all(Result::is_ok));
        assert_eq!(counter.value(), 1_000);
    }
}
