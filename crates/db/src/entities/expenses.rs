//! `SeaORM` Entity for the expenses table.
//!
//! Expense capture itself lives outside this service; this table holds
//! the rows the budget core needs: spend-so-far aggregation input and
//! the expense records produced by spend-from-savings.
//! `funded_by_savings` rows are excluded from every budget total.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub description: Option<String>,
    pub category_id: Option<Uuid>,
    pub payment_method_id: Option<Uuid>,
    pub expense_date: Date,
    pub funded_by_savings: bool,
    pub created_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
