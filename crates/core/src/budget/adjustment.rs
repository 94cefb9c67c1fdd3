//! Adjustment ledger arithmetic.
//!
//! Every mutation of a monthly budget's amount flows through here. The
//! persistence layer stores the *effective* delta (`new_total -
//! previous_total`), so folding the log in order always reproduces the
//! live amount even when the zero floor clamped a requested delta.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::AdjustmentKind;

/// The result of applying a delta to a budget amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedAdjustment {
    /// Amount before the adjustment.
    pub previous_total: Decimal,
    /// Amount after the adjustment (never negative).
    pub new_total: Decimal,
    /// Effective delta actually applied (`new_total - previous_total`).
    pub delta: Decimal,
    /// Ledger entry classification.
    pub kind: AdjustmentKind,
}

/// Validates an adjustment reason.
///
/// # Errors
///
/// Returns `BudgetError::EmptyReason` if the reason is empty or
/// whitespace-only.
pub fn validate_reason(reason: &str) -> Result<(), BudgetError> {
    if reason.trim().is_empty() {
        return Err(BudgetError::EmptyReason);
    }
    Ok(())
}

/// Applies a signed delta to the current amount.
///
/// The amount floor is zero: a delta that would drive the amount negative
/// clamps to zero instead of erroring. The first-ever entry for a budget
/// is classified `Initial`; later entries are `Increase` or `Decrease`
/// by the sign of the effective delta.
///
/// # Errors
///
/// Returns `BudgetError::ZeroDelta` for a zero requested delta and
/// `BudgetError::NoEffect` when the clamp leaves the amount unchanged
/// (withdrawing from an already-zero budget). A no-effect ledger row
/// would break both classification and replay.
pub fn apply_adjustment(
    current_amount: Decimal,
    requested_delta: Decimal,
    is_first_entry: bool,
) -> Result<AppliedAdjustment, BudgetError> {
    if requested_delta == Decimal::ZERO {
        return Err(BudgetError::ZeroDelta);
    }

    let new_total = (current_amount + requested_delta).max(Decimal::ZERO);
    let delta = new_total - current_amount;

    if delta == Decimal::ZERO {
        return Err(BudgetError::NoEffect);
    }

    let kind = if is_first_entry {
        AdjustmentKind::Initial
    } else if delta > Decimal::ZERO {
        AdjustmentKind::Increase
    } else {
        AdjustmentKind::Decrease
    };

    Ok(AppliedAdjustment {
        previous_total: current_amount,
        new_total,
        delta,
        kind,
    })
}

/// Folds stored effective deltas back into a budget amount.
///
/// This is the reconciliation primitive: for any committed log, the
/// replayed value must equal the live `amount`.
#[must_use]
pub fn replay_deltas<I>(deltas: I) -> Decimal
where
    I: IntoIterator<Item = Decimal>,
{
    deltas.into_iter().sum()
}
