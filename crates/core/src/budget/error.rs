//! Budget error types.

use rust_decimal::Decimal;
use thiserror::Error;

use kakebo_shared::Period;

use super::types::AllocationDimension;

/// Budget-related errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum BudgetError {
    /// Sub-budget amount must be strictly positive.
    #[error("Amount must be greater than zero")]
    AmountNotPositive,

    /// Monthly budget amount cannot be negative.
    #[error("Amount cannot be negative")]
    NegativeAmount,

    /// Child allocation attempted with no general budget row present.
    #[error("No general budget exists for {period}")]
    NoGeneralBudget {
        /// The period with no general budget.
        period: Period,
    },

    /// A single allocation exceeds the general budget on its own.
    #[error("Allocation of {candidate} exceeds the general budget of {general}")]
    ExceedsGeneralBudget {
        /// The candidate allocation amount.
        candidate: Decimal,
        /// The general budget amount.
        general: Decimal,
    },

    /// The combined allocations in one dimension exceed the general budget.
    #[error("Combined {dimension} allocations of {allocated} exceed the general budget of {general}")]
    OverAllocation {
        /// The dimension being validated.
        dimension: AllocationDimension,
        /// Sum of sibling allocations plus the candidate.
        allocated: Decimal,
        /// The general budget amount.
        general: Decimal,
    },

    /// Adjustment reason must be non-empty.
    #[error("Adjustment reason cannot be empty")]
    EmptyReason,

    /// Adjustment delta must be non-zero.
    #[error("Adjustment delta cannot be zero")]
    ZeroDelta,

    /// The zero floor clamped the adjustment down to nothing.
    #[error("Adjustment has no effect: the budget amount is already zero")]
    NoEffect,

    /// Percent thresholds are fractions in [0, 1].
    #[error("Percent threshold must be between 0 and 1, got {0}")]
    InvalidPercentThreshold(Decimal),

    /// Amount thresholds cannot be negative.
    #[error("Threshold amount cannot be negative")]
    NegativeThreshold,
}
