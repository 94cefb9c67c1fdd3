//! Allocation validation against the general monthly budget.
//!
//! Invariants enforced here, per dimension:
//! - no single sub-budget exceeds the general amount
//! - the sum of all sub-budgets never exceeds the general amount
//!
//! Callers must compute `sibling_total` excluding the row being updated,
//! so an edit is evaluated against its replacement value rather than
//! double-counted. The read of sibling state and the subsequent write
//! must happen inside one serialized transaction; this module only holds
//! the arithmetic.

use rust_decimal::Decimal;

use super::error::BudgetError;
use super::types::AllocationDimension;

/// Current allocation state for one owner, period, and dimension.
#[derive(Debug, Clone, Copy)]
pub struct AllocationCheck {
    /// The general monthly budget amount.
    pub general_amount: Decimal,
    /// Sum of sibling allocations in the same dimension, excluding the
    /// row being created or updated.
    pub sibling_total: Decimal,
}

/// Validates a candidate sub-budget amount against the general budget.
///
/// The two failure modes carry distinct messages: a single row larger
/// than the whole general budget reports `ExceedsGeneralBudget`, while a
/// combined overflow reports `OverAllocation`.
///
/// # Errors
///
/// Returns `BudgetError::AmountNotPositive`, `ExceedsGeneralBudget`, or
/// `OverAllocation`.
pub fn validate_allocation(
    dimension: AllocationDimension,
    check: AllocationCheck,
    candidate_amount: Decimal,
) -> Result<(), BudgetError> {
    if candidate_amount <= Decimal::ZERO {
        return Err(BudgetError::AmountNotPositive);
    }

    if candidate_amount > check.general_amount {
        return Err(BudgetError::ExceedsGeneralBudget {
            candidate: candidate_amount,
            general: check.general_amount,
        });
    }

    let allocated = check.sibling_total + candidate_amount;
    if allocated > check.general_amount {
        return Err(BudgetError::OverAllocation {
            dimension,
            allocated,
            general: check.general_amount,
        });
    }

    Ok(())
}
