//! Database enum types and their domain conversions.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use kakebo_core::budget::AdjustmentKind;
use kakebo_core::savings::{GoalStatus as DomainGoalStatus, SavingsTransactionKind};

/// Classification of an adjustment ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "adjustment_type")]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// First-ever entry for a budget.
    #[sea_orm(string_value = "INITIAL")]
    Initial,
    /// Positive delta.
    #[sea_orm(string_value = "INCREASE")]
    Increase,
    /// Negative delta.
    #[sea_orm(string_value = "DECREASE")]
    Decrease,
}

impl From<AdjustmentKind> for AdjustmentType {
    fn from(kind: AdjustmentKind) -> Self {
        match kind {
            AdjustmentKind::Initial => Self::Initial,
            AdjustmentKind::Increase => Self::Increase,
            AdjustmentKind::Decrease => Self::Decrease,
        }
    }
}

impl From<AdjustmentType> for AdjustmentKind {
    fn from(value: AdjustmentType) -> Self {
        match value {
            AdjustmentType::Initial => Self::Initial,
            AdjustmentType::Increase => Self::Increase,
            AdjustmentType::Decrease => Self::Decrease,
        }
    }
}

/// Savings goal lifecycle status.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "goal_status")]
#[serde(rename_all = "snake_case")]
pub enum GoalStatus {
    /// Accepting transactions, target not yet reached.
    #[sea_orm(string_value = "ACTIVE")]
    Active,
    /// Target was reached at least once.
    #[sea_orm(string_value = "COMPLETED")]
    Completed,
    /// Terminally closed by the user.
    #[sea_orm(string_value = "ARCHIVED")]
    Archived,
}

impl From<DomainGoalStatus> for GoalStatus {
    fn from(status: DomainGoalStatus) -> Self {
        match status {
            DomainGoalStatus::Active => Self::Active,
            DomainGoalStatus::Completed => Self::Completed,
            DomainGoalStatus::Archived => Self::Archived,
        }
    }
}

impl From<GoalStatus> for DomainGoalStatus {
    fn from(status: GoalStatus) -> Self {
        match status {
            GoalStatus::Active => Self::Active,
            GoalStatus::Completed => Self::Completed,
            GoalStatus::Archived => Self::Archived,
        }
    }
}

/// Savings transaction classification.
#[derive(Debug, Clone, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "savings_transaction_type")]
#[serde(rename_all = "snake_case")]
pub enum SavingsTransactionType {
    /// User-initiated deposit.
    #[sea_orm(string_value = "MANUAL_DEPOSIT")]
    ManualDeposit,
    /// Withdrawal (including spend-from-savings).
    #[sea_orm(string_value = "WITHDRAWAL")]
    Withdrawal,
    /// Leftover monthly budget swept into the goal.
    #[sea_orm(string_value = "BUDGET_SURPLUS")]
    BudgetSurplus,
}

impl From<SavingsTransactionKind> for SavingsTransactionType {
    fn from(kind: SavingsTransactionKind) -> Self {
        match kind {
            SavingsTransactionKind::ManualDeposit => Self::ManualDeposit,
            SavingsTransactionKind::Withdrawal => Self::Withdrawal,
            SavingsTransactionKind::BudgetSurplus => Self::BudgetSurplus,
        }
    }
}

impl From<SavingsTransactionType> for SavingsTransactionKind {
    fn from(value: SavingsTransactionType) -> Self {
        match value {
            SavingsTransactionType::ManualDeposit => Self::ManualDeposit,
            SavingsTransactionType::Withdrawal => Self::Withdrawal,
            SavingsTransactionType::BudgetSurplus => Self::BudgetSurplus,
        }
    }
}

/// Stored discriminant for the alert threshold tagged value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "threshold_kind")]
#[serde(rename_all = "snake_case")]
pub enum ThresholdKind {
    /// Absolute amount.
    #[sea_orm(string_value = "AMOUNT")]
    Amount,
    /// Fraction of the budget amount.
    #[sea_orm(string_value = "PERCENT")]
    Percent,
}
