//! `SeaORM` Entity for the monthly_budgets table.
//!
//! One row per (owner, month, year), created lazily with a zero amount
//! on first read. `amount` only ever changes through the adjustment
//! ledger.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ThresholdKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "monthly_budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub month: i32,
    pub year: i32,
    pub amount: Decimal,
    pub currency: String,
    pub alert_threshold: Option<Decimal>,
    pub alert_threshold_kind: Option<ThresholdKind>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::budget_adjustments::Entity")]
    BudgetAdjustments,
}

impl Related<super::budget_adjustments::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BudgetAdjustments.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
