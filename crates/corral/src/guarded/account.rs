#[cfg(feature = "tracing")]
use tracing::instrument;

use crate::{AccountError, Ledger, guarded::interface::check_amount};
use parking_lot::Mutex;
use std::sync::Arc;

/// A bank account whose balance can never be observed below zero.
///
/// The balance lives behind a [`Mutex`], and every operation runs its whole
/// read-compare-write sequence inside one critical section. In particular,
/// [`withdraw`](Self::withdraw) checks for sufficient funds and subtracts
/// under the same lock acquisition, so no concurrent withdrawal can slip in
/// between the check and the write.
///
/// Share one instance between tasks through the [`Arc`] returned by
/// [`Account::shared`]; the lock travels with the instance, never with a
/// copy.
///
/// ## Features
/// - ✅ Thread-safe
/// - ✅ Balance never negative under any interleaving
/// - ✅ Lock held only for the check-then-act pair, never across `.await`
///
/// ## See Also
/// - [`RacyAccount`](crate::RacyAccount), the unguarded counterexample
#[derive(Debug, Default)]
pub struct Account {
    balance: Mutex<i64>,
}

impl Account {
    /// Creates an account holding `initial`.
    pub fn new(initial: i64) -> Self {
        Self {
            balance: Mutex::new(initial),
        }
    }

    /// Creates an account holding `initial` behind a shareable handle.
    ///
    /// # Example
    /// ```
    /// use corral::{Account, AccountError};
    ///
    /// let account = Account::shared(300);
    /// let handle = std::sync::Arc::clone(&account);
    ///
    /// assert_eq!(handle.withdraw(200), Ok(100));
    /// assert_eq!(
    ///     account.withdraw(200),
    ///     Err(AccountError::InsufficientFunds { requested: 200, available: 100 })
    /// );
    /// assert_eq!(account.balance(), 100);
    /// ```
    pub fn shared(initial: i64) -> Arc<Self> {
        Arc::new(Self::new(initial))
    }

    /// Adds `amount` to the balance and returns the new balance.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InvalidAmount`] for non-positive amounts and
    /// [`AccountError::Overflow`] if the balance would exceed `i64::MAX`.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn deposit(&self, amount: i64) -> Result<i64, AccountError> {
        check_amount(amount)?;

        let balance = {
            let mut balance = self.balance.lock();
            *balance = balance.checked_add(amount).ok_or(AccountError::Overflow)?;
            *balance
        };

        #[cfg(feature = "tracing")]
        tracing::debug!("Deposited {amount}, new balance: {balance}");

        Ok(balance)
    }

    /// Subtracts `amount` if the balance covers it and returns the new
    /// balance.
    ///
    /// # Errors
    ///
    /// Returns [`AccountError::InsufficientFunds`] if the balance is lower
    /// than `amount`, leaving the balance unchanged, and
    /// [`AccountError::InvalidAmount`] for non-positive amounts.
    #[cfg_attr(feature = "tracing", instrument(level = "trace", skip(self)))]
    pub fn withdraw(&self, amount: i64) -> Result<i64, AccountError> {
        check_amount(amount)?;

        let outcome = {
            let mut balance = self.balance.lock();
            if *balance < amount {
                Err(AccountError::InsufficientFunds {
                    requested: amount,
                    available: *balance,
                })
            } else {
                *balance -= amount;
                Ok(*balance)
            }
        };

        #[cfg(feature = "tracing")]
        {
            match &outcome {
                Ok(balance) => tracing::debug!("Withdrew {amount}, new balance: {balance}"),
                Err(e) => tracing::debug!("Rejected withdrawal: {e}"),
            }
        }

        outcome
    }

    pub fn balance(&self) -> i64 {
        *self.balance.lock()
    }
}

impl Ledger for Account {
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
