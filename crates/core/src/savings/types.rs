//! Savings goal data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a savings goal.
///
/// `Active -> Completed` is automatic and one-way: it fires when the
/// balance reaches the target and never reverses, matching "goal was
/// once hit" semantics. `Archived` is explicit, user-triggered, and
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Accepting transactions, target not yet reached.
    Active,
    /// Target was reached at least once.
    Completed,
    /// Terminally closed by the user.
    Archived,
}

/// Classification of a savings transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavingsTransactionKind {
    /// User-initiated deposit.
    ManualDeposit,
    /// Withdrawal (including spend-from-savings).
    Withdrawal,
    /// Leftover monthly budget swept into the goal.
    BudgetSurplus,
}

impl SavingsTransactionKind {
    /// Whether this kind increases the balance.
    #[must_use]
    pub const fn is_deposit(self) -> bool {
        matches!(self, Self::ManualDeposit | Self::BudgetSurplus)
    }
}

/// The result of applying a transaction to a goal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedTransaction {
    /// Signed amount to append to the ledger (negative for withdrawals).
    pub signed_amount: Decimal,
    /// Balance after the transaction (never negative).
    pub new_balance: Decimal,
    /// Goal status after re-evaluating completion.
    pub new_status: GoalStatus,
}
