//! Initial database migration.
//!
//! Creates the enums and tables for monthly budgets, sub-budget
//! allocations, the adjustment ledger, savings goals with their
//! transaction ledger, and the expense rows the aggregator reads.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: BUDGET TABLES
        // ============================================================
        db.execute_unprepared(MONTHLY_BUDGETS_SQL).await?;
        db.execute_unprepared(CATEGORY_BUDGETS_SQL).await?;
        db.execute_unprepared(PAYMENT_METHOD_BUDGETS_SQL).await?;
        db.execute_unprepared(BUDGET_ADJUSTMENTS_SQL).await?;

        // ============================================================
        // PART 3: EXPENSES
        // ============================================================
        db.execute_unprepared(EXPENSES_SQL).await?;

        // ============================================================
        // PART 4: SAVINGS
        // ============================================================
        db.execute_unprepared(SAVINGS_GOALS_SQL).await?;
        db.execute_unprepared(SAVINGS_TRANSACTIONS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
-- Adjustment ledger entry classification
CREATE TYPE adjustment_type AS ENUM (
    'INITIAL',
    'INCREASE',
    'DECREASE'
);

-- Savings goal lifecycle
CREATE TYPE goal_status AS ENUM (
    'ACTIVE',
    'COMPLETED',
    'ARCHIVED'
);

-- Savings transaction classification
CREATE TYPE savings_transaction_type AS ENUM (
    'MANUAL_DEPOSIT',
    'WITHDRAWAL',
    'BUDGET_SURPLUS'
);

-- Discriminant for the stored alert threshold
CREATE TYPE threshold_kind AS ENUM (
    'AMOUNT',
    'PERCENT'
);
";

const MONTHLY_BUDGETS_SQL: &str = r"
CREATE TABLE monthly_budgets (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    year INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (amount >= 0),
    currency VARCHAR(3) NOT NULL,
    alert_threshold NUMERIC(19, 4),
    alert_threshold_kind threshold_kind,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_monthly_budgets_owner_period UNIQUE (owner_id, month, year),
    CONSTRAINT chk_monthly_budgets_threshold_pair CHECK (
        (alert_threshold IS NULL) = (alert_threshold_kind IS NULL)
    )
);

CREATE INDEX idx_monthly_budgets_owner ON monthly_budgets(owner_id);
";

const CATEGORY_BUDGETS_SQL: &str = r"
CREATE TABLE category_budgets (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    category_id UUID NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    year INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    currency VARCHAR(3) NOT NULL,
    alert_threshold NUMERIC(19, 4),
    alert_threshold_kind threshold_kind,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_category_budgets_owner_period UNIQUE (owner_id, category_id, month, year),
    CONSTRAINT chk_category_budgets_threshold_pair CHECK (
        (alert_threshold IS NULL) = (alert_threshold_kind IS NULL)
    )
);

CREATE INDEX idx_category_budgets_owner_period ON category_budgets(owner_id, year, month);
";

const PAYMENT_METHOD_BUDGETS_SQL: &str = r"
CREATE TABLE payment_method_budgets (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    payment_method_id UUID NOT NULL,
    month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
    year INTEGER NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    currency VARCHAR(3) NOT NULL,
    alert_threshold NUMERIC(19, 4),
    alert_threshold_kind threshold_kind,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_payment_method_budgets_owner_period
        UNIQUE (owner_id, payment_method_id, month, year),
    CONSTRAINT chk_payment_method_budgets_threshold_pair CHECK (
        (alert_threshold IS NULL) = (alert_threshold_kind IS NULL)
    )
);

CREATE INDEX idx_payment_method_budgets_owner_period
    ON payment_method_budgets(owner_id, year, month);
";

const BUDGET_ADJUSTMENTS_SQL: &str = r"
CREATE TABLE budget_adjustments (
    id UUID PRIMARY KEY,
    monthly_budget_id UUID NOT NULL REFERENCES monthly_budgets(id) ON DELETE CASCADE,
    delta_amount NUMERIC(19, 4) NOT NULL CHECK (delta_amount <> 0),
    previous_total NUMERIC(19, 4) NOT NULL,
    new_total NUMERIC(19, 4) NOT NULL CHECK (new_total >= 0),
    reason TEXT NOT NULL CHECK (length(trim(reason)) > 0),
    adjustment_type adjustment_type NOT NULL,
    idempotency_key VARCHAR(255),
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),

    CONSTRAINT uq_budget_adjustments_idempotency
        UNIQUE (monthly_budget_id, idempotency_key)
);

CREATE INDEX idx_budget_adjustments_budget_created
    ON budget_adjustments(monthly_budget_id, created_at DESC);
";

const EXPENSES_SQL: &str = r"
CREATE TABLE expenses (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    currency VARCHAR(3) NOT NULL,
    description TEXT,
    category_id UUID,
    payment_method_id UUID,
    expense_date DATE NOT NULL,
    funded_by_savings BOOLEAN NOT NULL DEFAULT FALSE,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_expenses_owner_date ON expenses(owner_id, expense_date);
";

const SAVINGS_GOALS_SQL: &str = r"
CREATE TABLE savings_goals (
    id UUID PRIMARY KEY,
    owner_id UUID NOT NULL,
    name VARCHAR(255) NOT NULL,
    target_amount NUMERIC(19, 4) NOT NULL CHECK (target_amount > 0),
    current_amount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (current_amount >= 0),
    currency VARCHAR(3) NOT NULL,
    deadline DATE,
    status goal_status NOT NULL DEFAULT 'ACTIVE',
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_savings_goals_owner ON savings_goals(owner_id);
";

const SAVINGS_TRANSACTIONS_SQL: &str = r"
CREATE TABLE savings_transactions (
    id UUID PRIMARY KEY,
    goal_id UUID NOT NULL REFERENCES savings_goals(id) ON DELETE CASCADE,
    amount NUMERIC(19, 4) NOT NULL CHECK (amount <> 0),
    transaction_type savings_transaction_type NOT NULL,
    description TEXT,
    linked_expense_id UUID REFERENCES expenses(id) ON DELETE SET NULL,
    created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
);

CREATE INDEX idx_savings_transactions_goal_created
    ON savings_transactions(goal_id, created_at DESC);
";

const DROP_ALL_SQL: &str = r"
DROP TABLE IF EXISTS savings_transactions;
DROP TABLE IF EXISTS savings_goals;
DROP TABLE IF EXISTS expenses;
DROP TABLE IF EXISTS budget_adjustments;
DROP TABLE IF EXISTS payment_method_budgets;
DROP TABLE IF EXISTS category_budgets;
DROP TABLE IF EXISTS monthly_budgets;

DROP TYPE IF EXISTS threshold_kind;
DROP TYPE IF EXISTS savings_transaction_type;
DROP TYPE IF EXISTS goal_status;
DROP TYPE IF EXISTS adjustment_type;
";
