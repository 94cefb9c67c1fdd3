//! Savings repository for goals and their signed-transaction ledger.
//!
//! Every balance mutation locks the goal row inside a transaction, so
//! concurrent withdrawals against the same goal serialize and the
//! overdraw check never runs on a stale balance.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, SqlErr, TransactionTrait,
};
use tracing::info;
use uuid::Uuid;

use kakebo_core::savings::{SavingsTransactionKind, apply_transaction, validate_target};
use kakebo_shared::DEFAULT_CURRENCY;

use crate::entities::{
    expenses, savings_goals, savings_transactions,
    sea_orm_active_enums::{GoalStatus, SavingsTransactionType},
};

/// Error types for savings operations.
#[derive(Debug, thiserror::Error)]
pub enum SavingsError {
    /// Domain rule violation (overdraw, archived goal, invalid amount).
    #[error(transparent)]
    Domain(#[from] kakebo_core::savings::SavingsError),

    /// Goal does not exist or belongs to another user.
    #[error("Savings goal {0} not found")]
    GoalNotFound(Uuid),

    /// Lost a concurrent-write race; the caller should retry.
    #[error("Concurrent update conflict")]
    Conflict,

    /// Database error.
    #[error("Database error: {0}")]
    Database(DbErr),
}

impl From<DbErr> for SavingsError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => Self::Conflict,
            _ => Self::Database(err),
        }
    }
}

/// Input for creating a savings goal.
#[derive(Debug, Clone)]
pub struct CreateGoalInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Display name.
    pub name: String,
    /// Target amount; must be strictly positive.
    pub target_amount: Decimal,
    /// Currency; defaults to the service default.
    pub currency: Option<String>,
    /// Optional target date.
    pub deadline: Option<NaiveDate>,
}

/// Input for spend-from-savings: one withdrawal plus one expense record,
/// committed atomically.
#[derive(Debug, Clone)]
pub struct SpendFromSavingsInput {
    /// Owning user.
    pub owner_id: Uuid,
    /// Goal to withdraw from.
    pub goal_id: Uuid,
    /// Unsigned spend amount.
    pub amount: Decimal,
    /// Expense description, also used for the ledger entry.
    pub description: Option<String>,
    /// Expense category, if any.
    pub category_id: Option<Uuid>,
    /// Payment method, if any.
    pub payment_method_id: Option<Uuid>,
    /// Date the expense occurred.
    pub expense_date: NaiveDate,
}

/// A committed savings transaction: the updated goal and its ledger row.
#[derive(Debug, Clone)]
pub struct TransactionOutcome {
    /// Updated goal (balance and possibly status changed).
    pub goal: savings_goals::Model,
    /// The appended ledger row with its signed amount.
    pub transaction: savings_transactions::Model,
}

/// A committed spend-from-savings: withdrawal plus linked expense.
#[derive(Debug, Clone)]
pub struct SpendFromSavingsOutcome {
    /// Updated goal.
    pub goal: savings_goals::Model,
    /// The withdrawal ledger row, linked to the expense.
    pub transaction: savings_transactions::Model,
    /// The created expense, flagged `funded_by_savings`.
    pub expense: expenses::Model,
}

/// Savings repository for goals and transactions.
#[derive(Debug, Clone)]
pub struct SavingsRepository {
    db: DatabaseConnection,
}

impl SavingsRepository {
    /// Creates a new savings repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    // ========================================================================
    // Goals
    // ========================================================================

    /// Creates a savings goal with a zero balance.
    ///
    /// # Errors
    ///
    /// Returns `TargetNotPositive` for a non-positive target, and
    /// database errors otherwise.
    pub async fn create_goal(
        &self,
        input: CreateGoalInput,
    ) -> Result<savings_goals::Model, SavingsError> {
        validate_target(input.target_amount)?;

        let now = Utc::now().into();
        let goal = savings_goals::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(input.owner_id),
            name: Set(input.name),
            target_amount: Set(input.target_amount),
            current_amount: Set(Decimal::ZERO),
            currency: Set(input
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())),
            deadline: Set(input.deadline),
            status: Set(GoalStatus::Active),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&self.db)
        .await?;

        info!(goal_id = %goal.id, target = %goal.target_amount, "Savings goal created");
        Ok(goal)
    }

    /// Gets a goal by ID, scoped to its owner.
    ///
    /// # Errors
    ///
    /// Returns `GoalNotFound` when absent or owned by another user.
    pub async fn get_goal(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
    ) -> Result<savings_goals::Model, SavingsError> {
        savings_goals::Entity::find_by_id(goal_id)
            .filter(savings_goals::Column::OwnerId.eq(owner_id))
            .one(&self.db)
            .await?
            .ok_or(SavingsError::GoalNotFound(goal_id))
    }

    /// Lists a user's goals, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_goals(
        &self,
        owner_id: Uuid,
    ) -> Result<Vec<savings_goals::Model>, SavingsError> {
        let goals = savings_goals::Entity::find()
            .filter(savings_goals::Column::OwnerId.eq(owner_id))
            .order_by_desc(savings_goals::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(goals)
    }

    /// Archives a goal. Idempotent: archiving an archived goal is a
    /// no-op success. An archived goal rejects all further transactions.
    ///
    /// # Errors
    ///
    /// Returns `GoalNotFound` when absent, database errors otherwise.
    pub async fn archive_goal(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
    ) -> Result<savings_goals::Model, SavingsError> {
        let goal = self.get_goal(owner_id, goal_id).await?;
        if goal.status == GoalStatus::Archived {
            return Ok(goal);
        }

        let mut active: savings_goals::ActiveModel = goal.into();
        active.status = Set(GoalStatus::Archived);
        active.updated_at = Set(Utc::now().into());
        let goal = active.update(&self.db).await?;

        info!(goal_id = %goal.id, "Savings goal archived");
        Ok(goal)
    }

    /// Deletes a goal and, by cascade, its transactions.
    ///
    /// # Errors
    ///
    /// Returns `GoalNotFound` when absent, database errors otherwise.
    pub async fn delete_goal(&self, owner_id: Uuid, goal_id: Uuid) -> Result<(), SavingsError> {
        let result = savings_goals::Entity::delete_many()
            .filter(savings_goals::Column::Id.eq(goal_id))
            .filter(savings_goals::Column::OwnerId.eq(owner_id))
            .exec(&self.db)
            .await?;
        if result.rows_affected == 0 {
            return Err(SavingsError::GoalNotFound(goal_id));
        }
        info!(%goal_id, "Savings goal deleted");
        Ok(())
    }

    // ========================================================================
    // Transactions
    // ========================================================================

    /// Records a deposit or withdrawal against a goal.
    ///
    /// The overdraw check, balance update, status transition, and ledger
    /// insert are one transaction keyed by the locked goal row.
    ///
    /// # Errors
    ///
    /// Returns `GoalNotFound` when absent, domain errors for overdraws,
    /// archived goals, and non-positive amounts, and database errors
    /// otherwise.
    pub async fn record_transaction(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
        kind: SavingsTransactionKind,
        amount: Decimal,
        description: Option<String>,
    ) -> Result<TransactionOutcome, SavingsError> {
        let txn = self.db.begin().await?;
        let goal = Self::lock_goal(&txn, owner_id, goal_id).await?;

        let outcome =
            Self::append_transaction(&txn, goal, kind, amount, description, None).await?;
        txn.commit().await?;

        info!(
            goal_id = %outcome.goal.id,
            signed_amount = %outcome.transaction.amount,
            balance = %outcome.goal.current_amount,
            "Savings transaction recorded"
        );
        Ok(outcome)
    }

    /// Withdraws from a goal and records the linked expense atomically.
    ///
    /// The expense is flagged `funded_by_savings`, which keeps it out of
    /// every budget spend total, and carries the goal's currency.
    ///
    /// # Errors
    ///
    /// Same failure modes as [`Self::record_transaction`].
    pub async fn spend_from_savings(
        &self,
        input: SpendFromSavingsInput,
    ) -> Result<SpendFromSavingsOutcome, SavingsError> {
        let txn = self.db.begin().await?;
        let goal = Self::lock_goal(&txn, input.owner_id, input.goal_id).await?;
        let currency = goal.currency.clone();

        let now = Utc::now().into();
        let expense = expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(input.owner_id),
            amount: Set(input.amount),
            currency: Set(currency),
            description: Set(input.description.clone()),
            category_id: Set(input.category_id),
            payment_method_id: Set(input.payment_method_id),
            expense_date: Set(input.expense_date),
            funded_by_savings: Set(true),
            created_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let outcome = Self::append_transaction(
            &txn,
            goal,
            SavingsTransactionKind::Withdrawal,
            input.amount,
            input.description,
            Some(expense.id),
        )
        .await?;
        txn.commit().await?;

        info!(
            goal_id = %outcome.goal.id,
            expense_id = %expense.id,
            amount = %input.amount,
            "Spend-from-savings committed"
        );
        Ok(SpendFromSavingsOutcome {
            goal: outcome.goal,
            transaction: outcome.transaction,
            expense,
        })
    }

    /// Lists a goal's transactions, newest first.
    ///
    /// # Errors
    ///
    /// Returns `GoalNotFound` when the goal is absent or owned by
    /// another user, and database errors otherwise.
    pub async fn list_transactions(
        &self,
        owner_id: Uuid,
        goal_id: Uuid,
    ) -> Result<Vec<savings_transactions::Model>, SavingsError> {
        // Ownership gate before exposing the ledger.
        self.get_goal(owner_id, goal_id).await?;

        let transactions = savings_transactions::Entity::find()
            .filter(savings_transactions::Column::GoalId.eq(goal_id))
            .order_by_desc(savings_transactions::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(transactions)
    }

    // ========================================================================
    // Internal helpers
    // ========================================================================

    /// Finds the goal row with a `FOR UPDATE` lock.
    async fn lock_goal(
        txn: &DatabaseTransaction,
        owner_id: Uuid,
        goal_id: Uuid,
    ) -> Result<savings_goals::Model, SavingsError> {
        savings_goals::Entity::find_by_id(goal_id)
            .filter(savings_goals::Column::OwnerId.eq(owner_id))
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(SavingsError::GoalNotFound(goal_id))
    }

    /// Applies one transaction to a locked goal and appends the ledger
    /// row, all within the caller's transaction.
    async fn append_transaction(
        txn: &DatabaseTransaction,
        goal: savings_goals::Model,
        kind: SavingsTransactionKind,
        amount: Decimal,
        description: Option<String>,
        linked_expense_id: Option<Uuid>,
    ) -> Result<TransactionOutcome, SavingsError> {
        let applied = apply_transaction(
            goal.status.clone().into(),
            goal.current_amount,
            goal.target_amount,
            kind,
            amount,
        )?;

        let now = Utc::now().into();
        let transaction = savings_transactions::ActiveModel {
            id: Set(Uuid::new_v4()),
            goal_id: Set(goal.id),
            amount: Set(applied.signed_amount),
            transaction_type: Set(SavingsTransactionType::from(kind)),
            description: Set(description),
            linked_expense_id: Set(linked_expense_id),
            created_at: Set(now),
        }
        .insert(txn)
        .await?;

        let mut active: savings_goals::ActiveModel = goal.into();
        active.current_amount = Set(applied.new_balance);
        active.status = Set(applied.new_status.into());
        active.updated_at = Set(now);
        let goal = active.update(txn).await?;

        Ok(TransactionOutcome { goal, transaction })
    }
}
