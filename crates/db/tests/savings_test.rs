//! Integration tests for the savings repository.
//!
//! These tests require a running Postgres instance. Set `DATABASE_URL`
//! to enable them; they skip silently otherwise.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use sea_orm::{ColumnTrait, Database, DatabaseConnection, EntityTrait, QueryFilter};
use uuid::Uuid;

use kakebo_core::savings::{SavingsError as DomainError, SavingsTransactionKind};
use kakebo_db::entities::{savings_transactions, sea_orm_active_enums::GoalStatus};
use kakebo_db::migration::{Migrator, MigratorTrait};
use kakebo_db::repositories::{
    CreateGoalInput, ExpenseRepository, SavingsError, SavingsRepository, SpendFromSavingsInput,
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

fn goal_input(owner_id: Uuid, target: Decimal) -> CreateGoalInput {
    CreateGoalInput {
        owner_id,
        name: "Emergency fund".to_string(),
        target_amount: target,
        currency: None,
        deadline: None,
    }
}

#[tokio::test]
async fn test_create_and_list_goals() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db);
    let owner_id = Uuid::new_v4();

    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");
    assert_eq!(goal.current_amount, Decimal::ZERO);
    assert_eq!(goal.status, GoalStatus::Active);

    let goals = repo.list_goals(owner_id).await.expect("Failed to list");
    assert_eq!(goals.len(), 1);
    assert_eq!(goals[0].id, goal.id);

    // Other users never see the goal.
    let other = repo
        .get_goal(Uuid::new_v4(), goal.id)
        .await;
    assert!(matches!(other, Err(SavingsError::GoalNotFound(_))));
}

#[tokio::test]
async fn test_deposit_completes_goal_at_target() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db);
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");

    let outcome = repo
        .record_transaction(
            owner_id,
            goal.id,
            SavingsTransactionKind::ManualDeposit,
            dec!(300),
            None,
        )
        .await
        .expect("Failed to deposit");
    assert_eq!(outcome.goal.status, GoalStatus::Active);

    let outcome = repo
        .record_transaction(
            owner_id,
            goal.id,
            SavingsTransactionKind::BudgetSurplus,
            dec!(200),
            Some("July leftovers".to_string()),
        )
        .await
        .expect("Failed to deposit surplus");
    assert_eq!(outcome.goal.current_amount, dec!(500));
    assert_eq!(outcome.goal.status, GoalStatus::Completed);

    // Completion never reverses, even when the balance drops back.
    let outcome = repo
        .record_transaction(
            owner_id,
            goal.id,
            SavingsTransactionKind::Withdrawal,
            dec!(100),
            None,
        )
        .await
        .expect("Failed to withdraw");
    assert_eq!(outcome.goal.current_amount, dec!(400));
    assert_eq!(outcome.goal.status, GoalStatus::Completed);
    assert_eq!(outcome.transaction.amount, dec!(-100));
}

#[tokio::test]
async fn test_withdrawal_overdraw_rejected() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db);
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");

    repo.record_transaction(
        owner_id,
        goal.id,
        SavingsTransactionKind::ManualDeposit,
        dec!(30),
        None,
    )
    .await
    .expect("Failed to deposit");

    let result = repo
        .record_transaction(
            owner_id,
            goal.id,
            SavingsTransactionKind::Withdrawal,
            dec!(50),
            None,
        )
        .await;
    match result {
        Err(SavingsError::Domain(DomainError::InsufficientFunds {
            requested,
            available,
        })) => {
            assert_eq!(requested, dec!(50));
            assert_eq!(available, dec!(30));
        }
        other => panic!("Expected InsufficientFunds, got {other:?}"),
    }

    // All-or-nothing: the balance is untouched.
    let goal = repo
        .get_goal(owner_id, goal.id)
        .await
        .expect("Failed to get goal");
    assert_eq!(goal.current_amount, dec!(30));
}

#[tokio::test]
async fn test_archive_is_idempotent_and_terminal() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db);
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");

    let archived = repo
        .archive_goal(owner_id, goal.id)
        .await
        .expect("Failed to archive");
    assert_eq!(archived.status, GoalStatus::Archived);

    let again = repo
        .archive_goal(owner_id, goal.id)
        .await
        .expect("Repeat archive should be a no-op");
    assert_eq!(again.status, GoalStatus::Archived);

    let result = repo
        .record_transaction(
            owner_id,
            goal.id,
            SavingsTransactionKind::ManualDeposit,
            dec!(10),
            None,
        )
        .await;
    assert!(matches!(
        result,
        Err(SavingsError::Domain(DomainError::GoalArchived))
    ));
}

#[tokio::test]
async fn test_spend_from_savings_is_invisible_to_budgets() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db.clone());
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");

    repo.record_transaction(
        owner_id,
        goal.id,
        SavingsTransactionKind::ManualDeposit,
        dec!(200),
        None,
    )
    .await
    .expect("Failed to deposit");

    let expense_date = NaiveDate::from_ymd_opt(2026, 8, 15).expect("valid date");
    let outcome = repo
        .spend_from_savings(SpendFromSavingsInput {
            owner_id,
            goal_id: goal.id,
            amount: dec!(80),
            description: Some("Laptop repair".to_string()),
            category_id: None,
            payment_method_id: None,
            expense_date,
        })
        .await
        .expect("Failed to spend from savings");

    assert_eq!(outcome.goal.current_amount, dec!(120));
    assert_eq!(outcome.transaction.amount, dec!(-80));
    assert_eq!(outcome.transaction.linked_expense_id, Some(outcome.expense.id));
    assert!(outcome.expense.funded_by_savings);
    assert_eq!(outcome.expense.currency, goal.currency);

    // The linked expense never counts against any budget.
    let spent = ExpenseRepository::new(db)
        .spent_total(owner_id, Period::new(2026, 8).expect("valid month"), None)
        .await
        .expect("Failed to total");
    assert_eq!(spent, Decimal::ZERO);
}

#[tokio::test]
async fn test_balance_matches_ledger_fold() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db.clone());
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(1000)))
        .await
        .expect("Failed to create goal");

    for (kind, amount) in [
        (SavingsTransactionKind::ManualDeposit, dec!(120)),
        (SavingsTransactionKind::BudgetSurplus, dec!(45.50)),
        (SavingsTransactionKind::Withdrawal, dec!(60)),
        (SavingsTransactionKind::ManualDeposit, dec!(10)),
    ] {
        repo.record_transaction(owner_id, goal.id, kind, amount, None)
            .await
            .expect("Failed to record transaction");
    }

    let goal = repo
        .get_goal(owner_id, goal.id)
        .await
        .expect("Failed to get goal");
    let transactions = repo
        .list_transactions(owner_id, goal.id)
        .await
        .expect("Failed to list transactions");
    let folded: Decimal = transactions.iter().map(|t| t.amount).sum();
    assert_eq!(folded, goal.current_amount);
    assert_eq!(goal.current_amount, dec!(115.50));
}

#[tokio::test]
async fn test_delete_goal_cascades_to_transactions() {
    let Some(db) = connect_or_skip().await else {
        return;
    };
    let repo = SavingsRepository::new(db.clone());
    let owner_id = Uuid::new_v4();
    let goal = repo
        .create_goal(goal_input(owner_id, dec!(500)))
        .await
        .expect("Failed to create goal");

    repo.record_transaction(
        owner_id,
        goal.id,
        SavingsTransactionKind::ManualDeposit,
        dec!(25),
        None,
    )
    .await
    .expect("Failed to deposit");

    repo.delete_goal(owner_id, goal.id)
        .await
        .expect("Failed to delete goal");

    let orphans = savings_transactions::Entity::find()
        .filter(savings_transactions::Column::GoalId.eq(goal.id))
        .all(&db)
        .await
        .expect("Failed to query transactions");
    assert!(orphans.is_empty());

    let result = repo.delete_goal(owner_id, goal.id).await;
    assert!(matches!(result, Err(SavingsError::GoalNotFound(_))));
}
