//! `SeaORM` Entity for the payment_method_budgets table.
//!
//! Payment-method allocations against the general monthly budget; an
//! allocation dimension independent of categories. Unique per (owner,
//! payment method, month, year).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::ThresholdKind;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_method_budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub owner_id: Uuid,
    pub payment_method_id: Uuid,
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
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
