//! Budget repository for monthly budgets, sub-budget allocations, and
//! the adjustment ledger.
//!
//! Every mutation that validates against sibling or parent state takes a
//! `FOR UPDATE` lock on the monthly budget row inside a transaction, so
//! two concurrent allocations for the same period serialize instead of
//! both passing validation on a stale sibling sum.

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::debug;
use uuid::Uuid;

use kakebo_core::budget::{
    AllocationCheck, AllocationDimension, Threshold, apply_adjustment, validate_allocation,
    validate_reason,
};
use kakebo_shared::Period;

use crate::entities::{
    budget_adjustments, category_budgets, monthly_budgets, payment_method_budgets,
    sea_orm_active_enums::ThresholdKind,
};

/// Error types for budget operations.
#[derive(Debug, thiserror::Error)]
pub enum BudgetError {
    /// Domain rule violation (allocation, threshold, adjustment rules).
    #[error(transparent)]
    Domain(#[from] kakebo_core::budget::BudgetError),

    /// An adjustment with this idempotency key was already recorded.
    #[error("Adjustment already recorded for idempotency key {0:?}")]
    DuplicateAdjustment(String),

    /// Lost a concurrent-write race; the caller should retry.
    #[error("Concurrent update conflict")]
    Conflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for BudgetError {
    fn from(err: DbErr) -> Self {
        // Unique-constraint races surface as retryable conflicts.
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict,
            _ => Self::Database(err),
        }
    }
}

/// Input for the direct-set path of the general budget.
#[derive(Debug, Clone)]
pub struct SetAmountInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Target amount (the delta is computed internally).
    pub amount: Decimal,
    /// New currency, when provided.
    pub currency: Option<String>,
    /// New alert threshold, when provided.
    pub alert_threshold: Option<Threshold>,
    /// Ledger reason for the implied adjustment.
    pub reason: String,
}

/// Input for creating or updating a sub-budget in either dimension.
#[derive(Debug, Clone)]
pub struct UpsertSubBudgetInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Category or payment-method ID.
    pub dimension_id: Uuid,
    /// Budget period.
    pub period: Period,
    /// Allocated amount.
    pub amount: Decimal,
    /// Currency; defaults to the general budget's currency on create.
    pub currency: Option<String>,
    /// Optional alert threshold.
    pub alert_threshold: Option<Threshold>,
}

/// A committed adjustment: the updated budget and its ledger entry.
#[derive(Debug, Clone)]
pub struct AdjustmentOutcome {
    /// Updated monthly budget row.
    pub budget: monthly_budgets::Model,
    /// The appended ledger entry.
    pub entry: budget_adjustments::Model,
}

/// Maps a domain threshold onto its two storage columns.
#[must_use]
pub fn threshold_to_columns(
    threshold: Option<&Threshold>,
) -> (Option<Decimal>, Option<ThresholdKind>) {
    match threshold {
        Some(Threshold::Amount(value)) => (Some(*value), Some(ThresholdKind::Amount)),
        Some(Threshold::Percent(value)) => (Some(*value), Some(ThresholdKind::Percent)),
        None => (None, None),
    }
}

/// Rebuilds a domain threshold from its storage columns.
#[must_use]
pub fn threshold_from_columns(
    value: Option<Decimal>,
    kind: Option<ThresholdKind>,
) -> Option<Threshold> {
    match (value, kind) {
        (Some(value), Some(ThresholdKind::Amount)) => Some(Threshold::Amount(value)),
        (Some(value), Some(ThresholdKind::Percent)) => Some(Threshold::Percent(value)),
        _ => None,
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn month_col(period: Period) -> i32 {
    period.month() as i32
}

/// Budget repository for monthly budgets and allocations.
#[derive(Debug, Clone)]
pub struct BudgetRepository {
    db: DatabaseConnection,
}

impl BudgetRepository {
    /// Creates a new budget repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Monthly budget
    // ========================================================================

    /// Gets the monthly budget for a period, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_monthly(
        &self,
        owner_id: Uuid,
        period: Period,
    ) -> Result<Option<monthly_budgets::Model>, BudgetError> {
        let budget = monthly_budgets::Entity::find()
            .filter(monthly_budgets::Column::OwnerId.eq(owner_id))
            .filter(monthly_budgets::Column::Month.eq(month_col(period)))
            .filter(monthly_budgets::Column::Year.eq(period.year()))
            .one(&self.db)
            .await?;
        Ok(budget)
    }

    /// Gets the monthly budget, materializing a zero-amount row if absent.
    ///
    /// Lazy creation writes no ledger entry; the first adjustment is the
    /// `INITIAL` one.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_or_create_monthly(
        &self,
        owner_id: Uuid,
        period: Period,
        currency: &str,
    ) -> Result<monthly_budgets::Model, BudgetError> {
        let txn = self.db.begin().await?;
        let budget = Self::lock_or_create_monthly(&txn, owner_id, period, currency).await?;
        txn.commit().await?;
        Ok(budget)
    }

    /// Adjusts the general budget amount through the ledger.
    ///
    /// The read of the current amount, the amount update, and the ledger
    /// insert are one transaction keyed by the locked budget row. A
    /// missing budget row is materialized first (amount zero), so the
    /// adjustment becomes its `INITIAL` entry.
    ///
    /// # Errors
    ///
    /// Returns domain errors for empty reasons and zero/no-effect deltas,
    /// `DuplicateAdjustment` for a repeated idempotency key, and database
    /// errors otherwise.
    pub async fn adjust(
        &self,
        owner_id: Uuid,
        period: Period,
        delta: Decimal,
        reason: &str,
        idempotency_key: Option<String>,
        currency: &str,
    ) -> Result<AdjustmentOutcome, BudgetError> {
        validate_reason(reason)?;

        let txn = self.db.begin().await?;
        let budget = Self::lock_or_create_monthly(&txn, owner_id, period, currency).await?;
        let outcome = Self::append_entry(&txn, budget, delta, reason, idempotency_key).await?;
        txn.commit().await?;

        debug!(
            budget_id = %outcome.budget.id,
            delta = %outcome.entry.delta_amount,
            new_total = %outcome.budget.amount,
            "Budget adjusted"
        );
        Ok(outcome)
    }

    /// Directly sets the general budget amount.
    ///
    /// Internally routed through the ledger with
    /// `delta = target - current`, so the log and the live amount never
    /// diverge. Setting the amount it already has updates only the
    /// currency/threshold fields and writes no ledger row.
    ///
    /// # Errors
    ///
    /// Returns a domain error for negative targets or invalid thresholds,
    /// and database errors otherwise.
    pub async fn set_amount(
        &self,
        input: SetAmountInput,
        default_currency: &str,
    ) -> Result<(monthly_budgets::Model, Option<budget_adjustments::Model>), BudgetError> {
        if input.amount < Decimal::ZERO {
            return Err(kakebo_core::budget::BudgetError::NegativeAmount.into());
        }
        if let Some(threshold) = &input.alert_threshold {
            threshold.validate()?;
        }
        validate_reason(&input.reason)?;

        let currency = input.currency.as_deref().unwrap_or(default_currency);
        let txn = self.db.begin().await?;
        let budget =
            Self::lock_or_create_monthly(&txn, input.owner_id, input.period, currency).await?;

        let delta = input.amount - budget.amount;
        let (mut budget, entry) = if delta == Decimal::ZERO {
            (budget, None)
        } else {
            let outcome = Self::append_entry(&txn, budget, delta, &input.reason, None).await?;
            (outcome.budget, Some(outcome.entry))
        };

        // Currency and threshold are plain fields, not ledger state.
        let mut active: monthly_budgets::ActiveModel = budget.clone().into();
        if let Some(currency) = input.currency {
            active.currency = Set(currency);
        }
        if input.alert_threshold.is_some() {
            let (value, kind) = threshold_to_columns(input.alert_threshold.as_ref());
            active.alert_threshold = Set(value);
            active.alert_threshold_kind = Set(kind);
        }
        active.updated_at = Set(Utc::now().into());
        budget = active.update(&txn).await?;

        txn.commit().await?;
        Ok((budget, entry))
    }

    /// Lists adjustment ledger entries for a period, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_adjustments(
        &self,
        owner_id: Uuid,
        period: Period,
    ) -> Result<Vec<budget_adjustments::Model>, BudgetError> {
        let Some(budget) = self.get_monthly(owner_id, period).await? else {
            return Ok(Vec::new());
        };

        let entries = budget_adjustments::Entity::find()
            .filter(budget_adjustments::Column::MonthlyBudgetId.eq(budget.id))
            .order_by_desc(budget_adjustments::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(entries)
    }

    // ========================================================================
    // Category budgets
    // ========================================================================

    /// Creates or updates a category allocation, validating it against
    /// the general budget inside a serialized transaction.
    ///
    /// # Errors
    ///
    /// Returns `NoGeneralBudget` when no monthly budget row exists for
    /// the period, `ExceedsGeneralBudget`/`OverAllocation` on validation
    /// failure, and database errors otherwise.
    pub async fn upsert_category_budget(
        &self,
        input: UpsertSubBudgetInput,
    ) -> Result<category_budgets::Model, BudgetError> {
        if let Some(threshold) = &input.alert_threshold {
            threshold.validate()?;
        }

        let txn = self.db.begin().await?;
        let general = Self::lock_monthly(&txn, input.owner_id, input.period)
            .await?
            .ok_or(kakebo_core::budget::BudgetError::NoGeneralBudget {
                period: input.period,
            })?;

        let existing = category_budgets::Entity::find()
            .filter(category_budgets::Column::OwnerId.eq(input.owner_id))
            .filter(category_budgets::Column::CategoryId.eq(input.dimension_id))
            .filter(category_budgets::Column::Month.eq(month_col(input.period)))
            .filter(category_budgets::Column::Year.eq(input.period.year()))
            .one(&txn)
            .await?;

        // Sibling sum excludes the row being updated so an edit is
        // evaluated against its replacement value.
        let sibling_total: Decimal = category_budgets::Entity::find()
            .filter(category_budgets::Column::OwnerId.eq(input.owner_id))
            .filter(category_budgets::Column::Month.eq(month_col(input.period)))
            .filter(category_budgets::Column::Year.eq(input.period.year()))
            .all(&txn)
            .await?
            .iter()
            .filter(|row| existing.as_ref().map(|e| e.id) != Some(row.id))
            .map(|row| row.amount)
            .sum();

        validate_allocation(
            AllocationDimension::Category,
            AllocationCheck {
                general_amount: general.amount,
                sibling_total,
            },
            input.amount,
        )?;

        let now = Utc::now().into();
        let (threshold_value, threshold_kind) = threshold_to_columns(input.alert_threshold.as_ref());

        let model = if let Some(existing) = existing {
            let mut active: category_budgets::ActiveModel = existing.into();
            active.amount = Set(input.amount);
            if let Some(currency) = input.currency {
                active.currency = Set(currency);
            }
            if input.alert_threshold.is_some() {
                active.alert_threshold = Set(threshold_value);
                active.alert_threshold_kind = Set(threshold_kind);
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            category_budgets::ActiveModel {
                id: Set(Uuid::new_v4()),
                owner_id: Set(input.owner_id),
                category_id: Set(input.dimension_id),
                month: Set(month_col(input.period)),
                year: Set(input.period.year()),
                amount: Set(input.amount),
                currency: Set(input.currency.unwrap_or_else(|| general.currency.clone())),
                alert_threshold: Set(threshold_value),
                alert_threshold_kind: Set(threshold_kind),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        };

        txn.commit().await?;
        Ok(model)
    }

    /// Gets a category allocation, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_category_budget(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        period: Period,
    ) -> Result<Option<category_budgets::Model>, BudgetError> {
        let row = category_budgets::Entity::find()
            .filter(category_budgets::Column::OwnerId.eq(owner_id))
            .filter(category_budgets::Column::CategoryId.eq(category_id))
            .filter(category_budgets::Column::Month.eq(month_col(period)))
            .filter(category_budgets::Column::Year.eq(period.year()))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    /// Deletes a category allocation, immediately freeing its share.
    ///
    /// Idempotent: deleting an absent row is a success.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_category_budget(
        &self,
        owner_id: Uuid,
        category_id: Uuid,
        period: Period,
    ) -> Result<(), BudgetError> {
        let result = category_budgets::Entity::delete_many()
            .filter(category_budgets::Column::OwnerId.eq(owner_id))
            .filter(category_budgets::Column::CategoryId.eq(category_id))
            .filter(category_budgets::Column::Month.eq(month_col(period)))
            .filter(category_budgets::Column::Year.eq(period.year()))
            .exec(&self.db)
            .await?;
        debug!(rows = result.rows_affected, %category_id, "Category budget deleted");
        Ok(())
    }

    /// Sums category allocations for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn category_total(
        &self,
        owner_id: Uuid,
        period: Period,
    ) -> Result<Decimal, BudgetError> {
        let rows = category_budgets::Entity::find()
            .filter(category_budgets::Column::OwnerId.eq(owner_id))
            .filter(category_budgets::Column::Month.eq(month_col(period)))
            .filter(category_budgets::Column::Year.eq(period.year()))
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(|row| row.amount).sum())
    }

    // ========================================================================
    // Payment-method budgets (independent dimension, same rules)
    // ========================================================================

    /// Creates or updates a payment-method allocation.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::upsert_category_budget`].
    pub async fn upsert_payment_method_budget(
        &self,
        input: UpsertSubBudgetInput,
    ) -> Result<payment_method_budgets::Model, BudgetError> {
        if let Some(threshold) = &input.alert_threshold {
            threshold.validate()?;
        }

        let txn = self.db.begin().await?;
        let general = Self::lock_monthly(&txn, input.owner_id, input.period)
            .await?
            .ok_or(kakebo_core::budget::BudgetError::NoGeneralBudget {
                period: input.period,
            })?;

        let existing = payment_method_budgets::Entity::find()
            .filter(payment_method_budgets::Column::OwnerId.eq(input.owner_id))
            .filter(payment_method_budgets::Column::PaymentMethodId.eq(input.dimension_id))
            .filter(payment_method_budgets::Column::Month.eq(month_col(input.period)))
            .filter(payment_method_budgets::Column::Year.eq(input.period.year()))
            .one(&txn)
            .await?;

        let sibling_total: Decimal = payment_method_budgets::Entity::find()
            .filter(payment_method_budgets::Column::OwnerId.eq(input.owner_id))
            .filter(payment_method_budgets::Column::Month.eq(month_col(input.period)))
            .filter(payment_method_budgets::Column::Year.eq(input.period.year()))
            .all(&txn)
            .await?
            .iter()
            .filter(|row| existing.as_ref().map(|e| e.id) != Some(row.id))
            .map(|row| row.amount)
            .sum();

        validate_allocation(
            AllocationDimension::PaymentMethod,
            AllocationCheck {
                general_amount: general.amount,
                sibling_total,
            },
            input.amount,
        )?;

        let now = Utc::now().into();
        let (threshold_value, threshold_kind) = threshold_to_columns(input.alert_threshold.as_ref());

        let model = if let Some(existing) = existing {
            let mut active: payment_method_budgets::ActiveModel = existing.into();
            active.amount = Set(input.amount);
            if let Some(currency) = input.currency {
                active.currency = Set(currency);
            }
            if input.alert_threshold.is_some() {
                active.alert_threshold = Set(threshold_value);
                active.alert_threshold_kind = Set(threshold_kind);
            }
            active.updated_at = Set(now);
            active.update(&txn).await?
        } else {
            payment_method_budgets::ActiveModel {
                id: Set(Uuid::new_v4()),
                owner_id: Set(input.owner_id),
                payment_method_id: Set(input.dimension_id),
                month: Set(month_col(input.period)),
                year: Set(input.period.year()),
                amount: Set(input.amount),
                currency: Set(input.currency.unwrap_or_else(|| general.currency.clone())),
                alert_threshold: Set(threshold_value),
                alert_threshold_kind: Set(threshold_kind),
                created_at: Set(now),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await?
        };

        txn.commit().await?;
        Ok(model)
    }

    /// Gets a payment-method allocation, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn get_payment_method_budget(
        &self,
        owner_id: Uuid,
        payment_method_id: Uuid,
        period: Period,
    ) -> Result<Option<payment_method_budgets::Model>, BudgetError> {
        let row = payment_method_budgets::Entity::find()
            .filter(payment_method_budgets::Column::OwnerId.eq(owner_id))
            .filter(payment_method_budgets::Column::PaymentMethodId.eq(payment_method_id))
            .filter(payment_method_budgets::Column::Month.eq(month_col(period)))
            .filter(payment_method_budgets::Column::Year.eq(period.year()))
            .one(&self.db)
            .await?;
        Ok(row)
    }

    /// Deletes a payment-method allocation. Idempotent.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_payment_method_budget(
        &self,
        owner_id: Uuid,
        payment_method_id: Uuid,
        period: Period,
    ) -> Result<(), BudgetError> {
        let result = payment_method_budgets::Entity::delete_many()
            .filter(payment_method_budgets::Column::OwnerId.eq(owner_id))
            .filter(payment_method_budgets::Column::PaymentMethodId.eq(payment_method_id))
            .filter(payment_method_budgets::Column::Month.eq(month_col(period)))
            .filter(payment_method_budgets::Column::Year.eq(period.year()))
            .exec(&self.db)
            .await?;
        debug!(rows = result.rows_affected, %payment_method_id, "Payment-method budget deleted");
        Ok(())
    }

    /// Sums payment-method allocations for a period.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn payment_method_total(
        &self,
        owner_id: Uuid,
        period: Period,
    ) -> Result<Decimal, BudgetError> {
        let rows = payment_method_budgets::Entity::find()
            .filter(payment_method_budgets::Column::OwnerId.eq(owner_id))
            .filter(payment_method_budgets::Column::Month.eq(month_col(period)))
            .filter(payment_method_budgets::Column::Year.eq(period.year()))
            .all(&self.db)
            .await?;
        Ok(rows.iter().map(|row| row.amount).sum())
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Finds the monthly budget row with a `FOR UPDATE` lock.
    async fn lock_monthly(
        txn: &DatabaseTransaction,
        owner_id: Uuid,
        period: Period,
    ) -> Result<Option<monthly_budgets::Model>, BudgetError> {
        let budget = monthly_budgets::Entity::find()
            .filter(monthly_budgets::Column::OwnerId.eq(owner_id))
            .filter(monthly_budgets::Column::Month.eq(month_col(period)))
            .filter(monthly_budgets::Column::Year.eq(period.year()))
            .lock_exclusive()
            .one(txn)
            .await?;
        Ok(budget)
    }

    /// Locks the monthly budget row, materializing a zero-amount row
    /// first when absent.
    async fn lock_or_create_monthly(
        txn: &DatabaseTransaction,
        owner_id: Uuid,
        period: Period,
        currency: &str,
    ) -> Result<monthly_budgets::Model, BudgetError> {
        if let Some(budget) = Self::lock_monthly(txn, owner_id, period).await? {
            return Ok(budget);
        }

        let now = Utc::now().into();
        let budget = monthly_budgets::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            month: Set(month_col(period)),
            year: Set(period.year()),
            amount: Set(Decimal::ZERO),
            currency: Set(currency.to_string()),
            alert_threshold: Set(None),
            alert_threshold_kind: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(txn)
        .await?;
        Ok(budget)
    }

    /// Applies a delta to a locked budget row and appends the ledger
    /// entry, all within the caller's transaction.
    async fn append_entry(
        txn: &DatabaseTransaction,
        budget: monthly_budgets::Model,
        delta: Decimal,
        reason: &str,
        idempotency_key: Option<String>,
    ) -> Result<AdjustmentOutcome, BudgetError> {
        if let Some(key) = &idempotency_key {
            let duplicate = budget_adjustments::Entity::find()
                .filter(budget_adjustments::Column::MonthlyBudgetId.eq(budget.id))
                .filter(budget_adjustments::Column::IdempotencyKey.eq(key.clone()))
                .one(txn)
                .await?;
            if duplicate.is_some() {
                return Err(BudgetError::DuplicateAdjustment(key.clone()));
            }
        }

        let entry_count = budget_adjustments::Entity::find()
            .filter(budget_adjustments::Column::MonthlyBudgetId.eq(budget.id))
            .count(txn)
            .await?;

        let applied = apply_adjustment(budget.amount, delta, entry_count == 0)?;

        let now = Utc::now().into();
        let entry = budget_adjustments::ActiveModel {
            id: Set(Uuid::new_v4()),
            monthly_budget_id: Set(budget.id),
            delta_amount: Set(applied.delta),
            previous_total: Set(applied.previous_total),
            new_total: Set(applied.new_total),
            reason: Set(reason.to_string()),
            adjustment_type: Set(applied.kind.into()),
            idempotency_key: Set(idempotency_key),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut active: monthly_budgets::ActiveModel = budget.into();
        active.amount = Set(applied.new_total);
        active.updated_at = Set(now);
        let budget = active.update(txn).await?;

        Ok(AdjustmentOutcome { budget, entry })
    }
}
