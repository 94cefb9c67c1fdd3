//! Integration tests for the budget repository.
//!
//! These tests require a running Postgres instance. Set `DATABASE_URL`
//! to enable them; they skip silently otherwise.

use futures::future::join_all;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ActiveModelTrait, ActiveValue::Set, Database, DatabaseConnection};
use std::sync::Arc;
use tokio::sync::Barrier;
use uuid::Uuid;

use kakebo_core::budget::{AllocationDimension, BudgetError as DomainError};
use kakebo_db::entities::expenses;
use kakebo_db::migration::{Migrator, MigratorTrait};
use kakebo_db::repositories::{
    BudgetError, BudgetRepository, ExpenseRepository, SetAmountInput, SpendDimension,
    UpsertSubBudgetInput,
};
use kakebo_shared::Period;

async fn connect_or_skip() -> Option<DatabaseConnection> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping integration test");
        return None;
    };
    let db = Database::connect(&url)
        .await
        .expect("Failed to connect to database");
    Migrator::up(&db, None)
        .await
        .expect("Failed to run migrations");
    Some(db)
}

fn period() -> Period {
    Period::new(2026, 8).expect("valid month")
}

fn set_input(owner_id: Uuid, amount: Decimal) -> SetAmountInput {
    SetAmountInput {
        owner_id,
        period: period(),
        amount,
        currency: None,
        alert_threshold: None,
        reason: "monthly planning".to_string(),
    }
}

fn sub_input(owner_id: Uuid, dimension_id: Uuid, amount: Decimal) -> UpsertSubBudgetInput {
    UpsertSubBudgetInput {
        owner_id,
        dimension_id,
        period: period(),
        amount,
        currency: None,
        alert_threshold: None,
    }
}

#[tokio::test]
async fn test_first_adjustment_is_initial() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();

    let outcome = repo
        .adjust(owner_id, period(), dec!(1000), "starting budget", None, "PEN")
        .await
        .expect("Failed to adjust");

    assert_eq!(outcome.budget.amount, dec!(1000));
    assert_eq!(outcome.entry.previous_total, Decimal::ZERO);
    assert_eq!(outcome.entry.new_total, dec!(1000));
    assert_eq!(outcome.entry.delta_amount, dec!(1000));
}

#[tokio::test]
async fn test_set_amount_writes_ledger_entries() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();

    let (budget, entry) = repo
        .set_amount(set_input(owner_id, dec!(500)), "PEN")
        .await
        .expect("Failed to set amount");
    assert_eq!(budget.amount, dec!(500));
    assert!(entry.is_some());

    let (budget, entry) = repo
        .set_amount(set_input(owner_id, dec!(800)), "PEN")
        .await
        .expect("Failed to set amount");
    assert_eq!(budget.amount, dec!(800));
    assert_eq!(entry.expect("delta entry").delta_amount, dec!(300));

    // Setting the current amount again is threshold/currency-only.
    let (budget, entry) = repo
        .set_amount(set_input(owner_id, dec!(800)), "PEN")
        .await
        .expect("Failed to set amount");
    assert_eq!(budget.amount, dec!(800));
    assert!(entry.is_none());

    let entries = repo
        .list_adjustments(owner_id, period())
        .await
        .expect("Failed to list adjustments");
    assert_eq!(entries.len(), 2);

    // The ledger fold always reproduces the live amount.
    let replayed: Decimal = entries.iter().map(|e| e.delta_amount).sum();
    assert_eq!(replayed, budget.amount);
}

#[tokio::test]
async fn test_duplicate_idempotency_key_rejected() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();
    let key = format!("retry-{}", Uuid::new_v4());

    repo.adjust(
        owner_id,
        period(),
        dec!(200),
        "bonus",
        Some(key.clone()),
        "PEN",
    )
    .await
    .expect("First adjustment should succeed");

    let result = repo
        .adjust(owner_id, period(), dec!(200), "bonus", Some(key), "PEN")
        .await;
    assert!(matches!(result, Err(BudgetError::DuplicateAdjustment(_))));

    // The retry left no trace.
    let budget = repo
        .get_monthly(owner_id, period())
        .await
        .expect("Failed to get budget")
        .expect("Budget should exist");
    assert_eq!(budget.amount, dec!(200));
}

#[tokio::test]
async fn test_overdraw_clamps_to_zero() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(300)), "PEN")
        .await
        .expect("Failed to set amount");

    let outcome = repo
        .adjust(owner_id, period(), dec!(-350), "cutting back", None, "PEN")
        .await
        .expect("Clamped decrease should succeed");

    assert_eq!(outcome.budget.amount, Decimal::ZERO);
    // The stored delta is the effective one, so replay reconciles.
    assert_eq!(outcome.entry.delta_amount, dec!(-300));
}

#[tokio::test]
async fn test_allocation_rejected_beyond_general() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();
    let food = Uuid::new_v4();
    let transport = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(1000)), "PEN")
        .await
        .expect("Failed to set amount");

    repo.upsert_category_budget(sub_input(owner_id, food, dec!(600)))
        .await
        .expect("First allocation should fit");

    let result = repo
        .upsert_category_budget(sub_input(owner_id, transport, dec!(500)))
        .await;
    match result {
        Err(BudgetError::Domain(DomainError::OverAllocation {
            dimension,
            allocated,
            general,
        })) => {
            assert_eq!(dimension, AllocationDimension::Category);
            assert_eq!(allocated, dec!(1100));
            assert_eq!(general, dec!(1000));
        }
        other => panic!("Expected OverAllocation, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_frees_capacity() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();
    let food = Uuid::new_v4();
    let transport = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(1000)), "PEN")
        .await
        .expect("Failed to set amount");
    repo.upsert_category_budget(sub_input(owner_id, food, dec!(600)))
        .await
        .expect("Failed to allocate");

    repo.delete_category_budget(owner_id, food, period())
        .await
        .expect("Failed to delete");

    repo.upsert_category_budget(sub_input(owner_id, transport, dec!(900)))
        .await
        .expect("Freed capacity should admit the new allocation");

    // Deleting again is an idempotent success.
    repo.delete_category_budget(owner_id, food, period())
        .await
        .expect("Repeat delete should be a no-op");
}

#[tokio::test]
async fn test_dimensions_do_not_compete() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db);
    let owner_id = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(1000)), "PEN")
        .await
        .expect("Failed to set amount");

    repo.upsert_category_budget(sub_input(owner_id, Uuid::new_v4(), dec!(1000)))
        .await
        .expect("Category dimension can use the full budget");
    repo.upsert_payment_method_budget(sub_input(owner_id, Uuid::new_v4(), dec!(1000)))
        .await
        .expect("Payment-method dimension has its own capacity");

    assert_eq!(
        repo.category_total(owner_id, period())
            .await
            .expect("Failed to total"),
        dec!(1000)
    );
    assert_eq!(
        repo.payment_method_total(owner_id, period())
            .await
            .expect("Failed to total"),
        dec!(1000)
    );
}

#[tokio::test]
async fn test_concurrent_adjustments_converge() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db.clone());
    let owner_id = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(100)), "PEN")
        .await
        .expect("Failed to set amount");

    let task_count = 8;
    let barrier = Arc::new(Barrier::new(task_count));
    let mut handles = Vec::with_capacity(task_count);
    for i in 0..task_count {
        let repo = BudgetRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.adjust(
                owner_id,
                Period::new(2026, 8).expect("valid month"),
                dec!(10),
                &format!("concurrent increase {i}"),
                None,
                "PEN",
            )
            .await
        }));
    }

    for result in join_all(handles).await {
        result
            .expect("Task panicked")
            .expect("Adjustment should serialize, not fail");
    }

    let budget = repo
        .get_monthly(owner_id, period())
        .await
        .expect("Failed to get budget")
        .expect("Budget should exist");
    assert_eq!(budget.amount, dec!(180));

    let entries = repo
        .list_adjustments(owner_id, period())
        .await
        .expect("Failed to list adjustments");
    let replayed: Decimal = entries.iter().map(|e| e.delta_amount).sum();
    assert_eq!(replayed, budget.amount);
}

#[tokio::test]
async fn test_concurrent_allocations_never_exceed_general() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = BudgetRepository::new(db.clone());
    let owner_id = Uuid::new_v4();

    repo.set_amount(set_input(owner_id, dec!(1000)), "PEN")
        .await
        .expect("Failed to set amount");

    // Four distinct categories racing for 400 each against a 1000 general
    // budget: only two can commit, the row lock serializes the rest.
    let task_count = 4;
    let barrier = Arc::new(Barrier::new(task_count));
    let mut handles = Vec::with_capacity(task_count);
    for _ in 0..task_count {
        let repo = BudgetRepository::new(db.clone());
        let barrier = Arc::clone(&barrier);
        let category_id = Uuid::new_v4();
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            repo.upsert_category_budget(sub_input(owner_id, category_id, dec!(400)))
                .await
        }));
    }

    let mut committed = 0u32;
    for result in join_all(handles).await {
        match result.expect("Task panicked") {
            Ok(_) => committed += 1,
            Err(BudgetError::Domain(DomainError::OverAllocation { general, .. })) => {
                assert_eq!(general, dec!(1000));
            }
            other => panic!("Expected OverAllocation, got {other:?}"),
        }
    }
    assert_eq!(committed, 2);

    let total = repo
        .category_total(owner_id, period())
        .await
        .expect("Failed to total");
    assert_eq!(total, dec!(800));
}

#[tokio::test]
async fn test_spent_total_excludes_savings_funded_rows() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let owner_id = Uuid::new_v4();
    let category_id = Uuid::new_v4();
    let now = chrono::Utc::now().into();

    for (amount, funded) in [(dec!(50), false), (dec!(70), true)] {
        expenses::ActiveModel {
            id: Set(Uuid::new_v4()),
            owner_id: Set(owner_id),
            amount: Set(amount),
            currency: Set("PEN".to_string()),
            description: Set(None),
            category_id: Set(Some(category_id)),
            payment_method_id: Set(None),
            expense_date: Set(period().first_day()),
            funded_by_savings: Set(funded),
            created_at: Set(now),
        }
        .insert(&db)
        .await
        .expect("Failed to insert expense");
    }

    let repo = ExpenseRepository::new(db);
    let total = repo
        .spent_total(owner_id, period(), None)
        .await
        .expect("Failed to total");
    assert_eq!(total, dec!(50));

    let by_category = repo
        .spent_total(owner_id, period(), Some(SpendDimension::Category(category_id)))
        .await
        .expect("Failed to total");
    assert_eq!(by_category, dec!(50));
}
