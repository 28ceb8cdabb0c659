use crate::AccountError;

/// A minimal interface for an integer balance shared between many callers.
///
/// Every method takes `&self`; implementations decide how concurrent calls
/// are serialized.
pub trait Ledger: Send + Sync {
    /// Adds `amount` and returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`AccountError::InvalidAmount`] if `amount <= 0`.
    /// - [`AccountError::Overflow`] if the balance would exceed `i64::MAX`.
    fn deposit(&self, amount: i64) -> Result<i64, AccountError>;

    /// Subtracts `amount` if the balance covers it and returns the new
    /// balance.
    ///
    /// # Errors
    ///
    /// - [`AccountError::InvalidAmount`] if `amount <= 0`.
    /// - [`AccountError::InsufficientFunds`] if the balance is lower than
    ///   `amount`; the balance is left unchanged.
    fn withdraw(&self, amount: i64) -> Result<i64, AccountError>;

    /// A snapshot of the current balance.
    fn balance(&self) -> i64;
}

pub(crate) const fn check_amount(amount: i64) -> Result<(), AccountError> {
    if amount <= 0 {
        return Err(AccountError::InvalidAmount { amount });
    }
    Ok(())
}
