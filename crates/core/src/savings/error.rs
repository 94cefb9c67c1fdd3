//! Savings error types.

use rust_decimal::Decimal;
use thiserror::Error;

/// Savings-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SavingsError {
    /// Transaction amounts must be strictly positive.
    #[error("Amount must be greater than zero")]
    AmountNotPositive,

    /// Goal targets must be strictly positive.
    #[error("Target amount must be greater than zero")]
    TargetNotPositive,

    /// Withdrawal larger than the current balance; no partial withdrawal.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// The requested withdrawal amount.
        requested: Decimal,
        /// The current goal balance.
        available: Decimal,
    },

    /// Archived goals accept no further transactions.
    #[error("Goal is archived and cannot accept transactions")]
    GoalArchived,
}
