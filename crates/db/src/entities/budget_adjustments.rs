//! `SeaORM` Entity for the budget_adjustments table.
//!
//! Append-only audit trail of monthly budget amount changes. Rows are
//! never updated or deleted; `delta_amount` is the effective delta, so
//! the log folded in order reproduces the live amount.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AdjustmentType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "budget_adjustments")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub monthly_budget_id: Uuid,
    pub delta_amount: Decimal,
    pub previous_total: Decimal,
    pub new_total: Decimal,
    pub reason: String,
    pub adjustment_type: AdjustmentType,
    /// Client-supplied key for safe retries; unique per budget.
    pub idempotency_key: Option<String>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::monthly_budgets::Entity",
        from = "Column::MonthlyBudgetId",
        to = "super::monthly_budgets::Column::Id"
    )]
    MonthlyBudgets,
}

impl Related<super::monthly_budgets::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::MonthlyBudgets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
