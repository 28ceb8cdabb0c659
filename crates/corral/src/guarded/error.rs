/// Expected outcomes of an account operation that leave the balance
/// unchanged.
///
/// These are normal business results reported to the caller, not faults of
/// the account or the pool.
#[derive(Clone, Copy, thiserror::Error, Debug, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum AccountError {
    /// The balance was lower than the requested withdrawal.
    #[error("insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds { requested: i64, available: i64 },

    /// Deposits and withdrawals must be strictly positive.
    #[error("invalid amount: {amount}")]
    InvalidAmount { amount: i64 },

    /// The deposit would push the balance past `i64::MAX`.
    #[error("balance overflow")]
    Overflow,
}
