//! `SeaORM` Entity for the savings_goals table.
//!
//! `current_amount` is derived state: it always equals the fold of the
//! goal's signed transaction amounts.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::GoalStatus;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_goals")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub name: String,
    pub target_amount: Decimal,
    pub current_amount: Decimal,
    pub currency: String,
    pub deadline: Option<Date>,
    pub status: GoalStatus,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::savings_transactions::Entity")]
    SavingsTransactions,
}

impl Related<super::savings_transactions::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
