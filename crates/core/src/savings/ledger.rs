//! Signed-transaction arithmetic for savings goals.

use rust_decimal::Decimal;

use super::error::SavingsError;
use super::types::{AppliedTransaction, GoalStatus, SavingsTransactionKind};

/// Validates a goal target amount.
///
/// # Errors
///
/// Returns `SavingsError::TargetNotPositive` unless the target is
/// strictly positive.
pub fn validate_target(target_amount: Decimal) -> Result<(), SavingsError> {
    if target_amount <= Decimal::ZERO {
        return Err(SavingsError::TargetNotPositive);
    }
    Ok(())
}

/// Re-evaluates the completion transition.
///
/// Idempotent: a `Completed` goal stays `Completed` even if the balance
/// later drops below the target, and `Archived` is terminal.
#[must_use]
pub fn completion_status(status: GoalStatus, balance: Decimal, target: Decimal) -> GoalStatus {
    match status {
        GoalStatus::Active if balance >= target => GoalStatus::Completed,
        other => other,
    }
}

/// Applies one transaction to a goal's balance and status.
///
/// `amount` is the unsigned user-supplied value; the returned
/// `signed_amount` carries the ledger sign (negative for withdrawals).
///
/// # Errors
///
/// Returns `SavingsError::AmountNotPositive` for non-positive amounts,
/// `SavingsError::GoalArchived` for transactions against archived goals,
/// and `SavingsError::InsufficientFunds` when a withdrawal exceeds the
/// balance (withdrawals are all-or-nothing).
pub fn apply_transaction(
    status: GoalStatus,
    balance: Decimal,
    target: Decimal,
    kind: SavingsTransactionKind,
    amount: Decimal,
) -> Result<AppliedTransaction, SavingsError> {
    if status == GoalStatus::Archived {
        return Err(SavingsError::GoalArchived);
    }
    if amount <= Decimal::ZERO {
        return Err(SavingsError::AmountNotPositive);
    }

    let signed_amount = if kind.is_deposit() {
        amount
    } else {
        if amount > balance {
            return Err(SavingsError::InsufficientFunds {
                requested: amount,
                available: balance,
            });
        }
        -amount
    };

    let new_balance = balance + signed_amount;
    let new_status = completion_status(status, new_balance, target);

    Ok(AppliedTransaction {
        signed_amount,
        new_balance,
        new_status,
    })
}

/// Folds signed transaction amounts into a balance.
///
/// For any committed goal, `balance_of` over its ledger must equal the
/// stored `current_amount`.
#[must_use]
pub fn balance_of<I>(signed_amounts: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    signed_amounts.into_iter().sum()
}
