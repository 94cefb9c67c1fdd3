//! `SeaORM` Entity for the savings_transactions table.
//!
//! `amount` is signed: positive for deposits, negative for withdrawals.
//! `linked_expense_id` is set when a spend-from-savings operation also
//! produced an expense record.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::SavingsTransactionType;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "savings_transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub goal_id: Uuid,
    pub amount: Decimal,
    pub transaction_type: SavingsTransactionType,
    pub description: Option<String>,
    pub linked_expense_id: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::savings_goals::Entity",
        from = "Column::GoalId",
        to = "super::savings_goals::Column::Id"
    )]
    SavingsGoals,
    #[sea_orm(
        belongs_to = "super::expenses::Entity",
        from = "Column::LinkedExpenseId",
        to = "super::expenses::Column::Id"
    )]
    Expenses,
}

impl Related<super::savings_goals::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::SavingsGoals.def()
    }
}

impl Related<super::expenses::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
