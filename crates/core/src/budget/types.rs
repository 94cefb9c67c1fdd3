//! Budget data types.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use kakebo_shared::Period;

use super::threshold::Threshold;

/// The two independent allocation dimensions against the general budget.
///
/// A category allocation never competes with a payment-method allocation;
/// each dimension is validated against the general amount on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationDimension {
    /// Spending category (food, transport, ...).
    Category,
    /// Payment method (card, cash, ...).
    PaymentMethod,
}

impl std::fmt::Display for AllocationDimension {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Category => write!(f, "category"),
            Self::PaymentMethod => write!(f, "payment method"),
        }
    }
}

/// The general budget for one owner and one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonthlyBudget {
    /// Budget ID.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Budgeted amount (never negative).
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Optional alert threshold.
    pub alert_threshold: Option<Threshold>,
}

/// A sub-budget row in one allocation dimension.
///
/// The same shape serves both dimensions; `dimension_id` is a category id
/// or a payment-method id depending on context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubBudget {
    /// Sub-budget ID.
    pub id: Uuid,
    /// Owning user.
    pub owner_id: Uuid,
    /// Category or payment-method ID.
    pub dimension_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Allocated amount (must be positive to exist).
    pub amount: Decimal,
    /// Currency code.
    pub currency: String,
    /// Optional alert threshold.
    pub alert_threshold: Option<Threshold>,
}

/// Classification of an adjustment ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
    /// First-ever entry for a budget.
    Initial,
    /// Positive delta after the first entry.
    Increase,
    /// Negative delta after the first entry.
    Decrease,
}

/// A budget read model: the row plus spend-so-far context.
///
/// `remaining` can legitimately be negative (overspend); that is a state,
/// not an error.
#[derive(Debug, Clone, Serialize)]
pub struct BudgetOverview {
    /// Budgeted amount.
    pub amount: Decimal,
    /// Spent so far, as reported by the expense aggregator.
    pub spent: Decimal,
    /// `amount - spent`.
    pub remaining: Decimal,
    /// Resolved absolute alert threshold, when one is configured.
    pub alert_threshold: Option<Decimal>,
    /// Whether `spent` has reached the threshold.
    pub alert_reached: bool,
}

impl BudgetOverview {
    /// Builds the read model from a budgeted amount, spent total, and
    /// optional threshold.
    #[must_use]
    pub fn new(amount: Decimal, spent: Decimal, threshold: Option<&Threshold>) -> Self {
        let alert_threshold = threshold.map(|t| t.resolve(amount));
        let alert_reached = alert_threshold
            .is_some_and(|absolute| super::threshold::threshold_reached(spent, absolute));

        Self {
            amount,
            spent,
            remaining: amount - spent,
            alert_threshold,
            alert_reached,
        }
    }
}
