//! Read-only expense aggregation feeding budget overviews.
//!
//! Spend totals always exclude `funded_by_savings` rows: money spent
//! from a savings goal never counts against any budget.

use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter};
use uuid::Uuid;

use kakebo_shared::Period;

use crate::entities::expenses;

/// Optional sub-budget dimension filter for a spend total.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpendDimension {
    /// Restrict to one category.
    Category(Uuid),
    /// Restrict to one payment method.
    PaymentMethod(Uuid),
}

/// Expense repository: spend aggregation only, capture lives elsewhere.
#[derive(Debug, Clone)]
pub struct ExpenseRepository {
    db: DatabaseConnection,
}

impl ExpenseRepository {
    /// Creates a new expense repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Sums a user's expenses for a period, optionally narrowed to one
    /// dimension. `funded_by_savings` rows are always excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn spent_total(
        &self,
        owner_id: Uuid,
        period: Period,
        dimension: Option<SpendDimension>,
    ) -> Result<Decimal, DbErr> {
        let mut query = expenses::Entity::find()
            .filter(expenses::Column::OwnerId.eq(owner_id))
            .filter(expenses::Column::ExpenseDate.gte(period.first_day()))
            .filter(expenses::Column::ExpenseDate.lt(period.first_day_of_next()))
            .filter(expenses::Column::FundedBySavings.eq(false));

        match dimension {
            Some(SpendDimension::Category(category_id)) => {
                query = query.filter(expenses::Column::CategoryId.eq(category_id));
            }
            Some(SpendDimension::PaymentMethod(payment_method_id)) => {
                query = query.filter(expenses::Column::PaymentMethodId.eq(payment_method_id));
            }
            None => {}
        }

        let rows = query.all(&self.db).await?;
        Ok(rows.iter().map(|row| row.amount).sum())
    }
}
