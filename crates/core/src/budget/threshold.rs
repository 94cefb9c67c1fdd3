//! Alert threshold resolution.
//!
//! Thresholds are stored as an explicit tagged value, never inferred
//! from numeric magnitude: an amount threshold of 0.5 currency units and
//! a 50% threshold are different values and stay different.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::BudgetError;

/// A user-configured alert threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Threshold {
    /// Absolute amount in the budget's currency.
    Amount(Decimal),
    /// Fraction of the budget amount, in [0, 1]. The UI collects 0-100
    /// and divides by 100 before this layer.
    Percent(Decimal),
}

impl Threshold {
    /// Validates the threshold value range.
    ///
    /// # Errors
    ///
    /// Returns `BudgetError::NegativeThreshold` for negative amounts and
    /// `BudgetError::InvalidPercentThreshold` for percents outside [0, 1].
    pub fn validate(&self) -> Result<(), BudgetError> {
        match *self {
            Self::Amount(value) => {
                if value < Decimal::ZERO {
                    return Err(BudgetError::NegativeThreshold);
                }
            }
            Self::Percent(value) => {
                if value < Decimal::ZERO || value > Decimal::ONE {
                    return Err(BudgetError::InvalidPercentThreshold(value));
                }
            }
        }
        Ok(())
    }

    /// Normalizes the threshold into a single comparable absolute amount.
    #[must_use]
    pub fn resolve(&self, budget_amount: Decimal) -> Decimal {
        match *self {
            Self::Amount(value) => value,
            Self::Percent(value) => value * budget_amount,
        }
    }
}

/// Whether spend-so-far has reached an absolute threshold.
///
/// A threshold of zero (or one that resolves to zero) never fires; that
/// is documented policy for unset/zero thresholds, not a bug.
#[must_use]
pub fn threshold_reached(spent: Decimal, absolute_threshold: Decimal) -> bool {
    absolute_threshold > Decimal::ZERO && spent >= absolute_threshold
}
