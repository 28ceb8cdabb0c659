use crate::{AccountError, Ledger, guarded::interface::check_amount};
use core::time::Duration;
use portable_atomic::{AtomicI64, Ordering};

/// An account that checks the balance and subtracts in two separate steps,
/// with no critical section around them.
///
/// **Do not use.** This type is the negative control for [`Account`]: every
/// individual load and subtraction is atomic, yet the check-then-act pair is
/// not, so concurrent withdrawals that all pass the check before any of them
/// subtracts drive the balance below zero. The configurable `delay` widens
/// the window between the check and the write to make the race observable.
///
/// ## Features
/// - ❌ Check-then-act is not atomic
/// - ❌ Balance can go negative under contention
///
/// [`Account`]: crate::Account
#[derive(Debug)]
pub struct RacyAccount {
    balance: AtomicI64,
    delay: Duration,
}

impl RacyAccount {
    pub fn new(initial: i64) -> Self {
        Self::with_delay(initial, Duration::ZERO)
    }

    /// Creates an account that sleeps the calling thread for `delay`
    /// between the balance check and the subtraction.
    pub fn with_delay(initial: i64, delay: Duration) -> Self {
        Self {
            balance: AtomicI64::new(initial),
            delay,
        }
    }

    pub fn deposit(&self, amount: i64) -> Result<i64, AccountError> {
        check_amount(amount)?;
        // Deposits stay correct; only withdraw splits its check from its write.
        let previous = self
            .balance
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |b| b.checked_add(amount))
            .map_err(|_| AccountError::Overflow)?;
        Ok(previous + amount)
    }

    /// Withdraws without holding anything across the check and the write.
    ///
    /// Blocks the calling thread for the configured delay, so run it on a
    /// dedicated thread or a blocking task.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InsufficientFunds`] if the balance *seen at
    /// check time* is lower than `amount`.
    pub fn withdraw(&self, amount: i64) -> Result<i64, AccountError> {
        check_amount(amount)?;

        let seen = self.balance.load(Ordering::SeqCst);
        if seen < amount {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: seen,
            });
        }

        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }

        // Acts on a stale check: other withdrawals may have landed meanwhile.
        let previous = self.balance.fetch_sub(amount, Ordering::SeqCst);
        Ok(previous.wrapping_sub(amount))
    }

    pub fn balance(&self) -> i64 {
        self.balance.load(Ordering::SeqCst)
    }
}

impl Ledger for RacyAccount {
    fn deposit(&self, amount: i64) -> Result<i64, AccountError> {
        self.deposit(amount)
    }

    fn withdraw(&self, amount: i64) -> Result<i64, AccountError> {
        self.withdraw(amount)
    }

    fn balance(&self) -> i64 {
        self.balance()
    }
}
