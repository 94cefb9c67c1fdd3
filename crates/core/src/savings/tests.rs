//! Tests for the savings goal ledger and state machine.

use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use super::error::SavingsError;
use super::ledger::{apply_transaction, balance_of, completion_status, validate_target};
use super::types::{GoalStatus, SavingsTransactionKind};

#[test]
fn deposit_increases_balance() {
    let applied = apply_transaction(
        GoalStatus::Active,
        dec!(100),
        dec!(500),
        SavingsTransactionKind::ManualDeposit,
        dec!(50),
    )
    .unwrap();

    assert_eq!(applied.signed_amount, dec!(50));
    assert_eq!(applied.new_balance, dec!(150));
    assert_eq!(applied.new_status, GoalStatus::Active);
}

#[test]
fn budget_surplus_counts_as_deposit() {
    let applied = apply_transaction(
        GoalStatus::Active,
        dec!(0),
        dec!(500),
        SavingsTransactionKind::BudgetSurplus,
        dec!(120),
    )
    .unwrap();

    assert_eq!(applied.signed_amount, dec!(120));
    assert_eq!(applied.new_balance, dec!(120));
}

#[test]
fn withdrawal_is_signed_negative() {
    let applied = apply_transaction(
        GoalStatus::Active,
        dec!(200),
        dec!(500),
        SavingsTransactionKind::Withdrawal,
        dec!(80),
    )
    .unwrap();

    assert_eq!(applied.signed_amount, dec!(-80));
    assert_eq!(applied.new_balance, dec!(120));
}

/// Balance 30, withdraw 50: rejected whole, balance untouched.
#[test]
fn rejects_overdraw_without_partial_withdrawal() {
    let result = apply_transaction(
        GoalStatus::Active,
        dec!(30),
        dec!(500),
        SavingsTransactionKind::Withdrawal,
        dec!(50),
    );

    assert_eq!(
        result,
        Err(SavingsError::InsufficientFunds {
            requested: dec!(50),
            available: dec!(30),
        })
    );
}

/// Scenario: target 500, deposit 300 keeps the goal active, deposit 200
/// completes it.
#[test]
fn completes_when_target_reached() {
    let first = apply_transaction(
        GoalStatus::Active,
        dec!(0),
        dec!(500),
        SavingsTransactionKind::ManualDeposit,
        dec!(300),
    )
    .unwrap();
    assert_eq!(first.new_status, GoalStatus::Active);
    assert_eq!(first.new_balance, dec!(300));

    let second = apply_transaction(
        first.new_status,
        first.new_balance,
        dec!(500),
        SavingsTransactionKind::ManualDeposit,
        dec!(200),
    )
    .unwrap();
    assert_eq!(second.new_balance, dec!(500));
    assert_eq!(second.new_status, GoalStatus::Completed);
}

#[test]
fn completion_does_not_reverse() {
    // Goal was once hit; withdrawing below target keeps it Completed.
    let applied = apply_transaction(
        GoalStatus::Completed,
        dec!(500),
        dec!(500),
        SavingsTransactionKind::Withdrawal,
        dec!(400),
    )
    .unwrap();

    assert_eq!(applied.new_balance, dec!(100));
    assert_eq!(applied.new_status, GoalStatus::Completed);
}

#[test]
fn archived_goals_reject_transactions() {
    let result = apply_transaction(
        GoalStatus::Archived,
        dec!(100),
        dec!(500),
        SavingsTransactionKind::ManualDeposit,
        dec!(10),
    );
    assert_eq!(result, Err(SavingsError::GoalArchived));
}

#[test]
fn rejects_non_positive_amounts() {
    for amount in [dec!(0), dec!(-25)] {
        let result = apply_transaction(
            GoalStatus::Active,
            dec!(100),
            dec!(500),
            SavingsTransactionKind::ManualDeposit,
            amount,
        );
        assert_eq!(result, Err(SavingsError::AmountNotPositive));
    }
}

#[test]
fn validates_goal_target() {
    assert!(validate_target(dec!(500)).is_ok());
    assert_eq!(validate_target(dec!(0)), Err(SavingsError::TargetNotPositive));
    assert_eq!(validate_target(dec!(-10)), Err(SavingsError::TargetNotPositive));
}

#[test]
fn completion_status_is_idempotent() {
    assert_eq!(
        completion_status(GoalStatus::Completed, dec!(10), dec!(500)),
        GoalStatus::Completed
    );
    assert_eq!(
        completion_status(GoalStatus::Archived, dec!(1000), dec!(500)),
        GoalStatus::Archived
    );
}

fn amount_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..100_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn kind_strategy() -> impl Strategy<Value = SavingsTransactionKind> {
    prop_oneof![
        Just(SavingsTransactionKind::ManualDeposit),
        Just(SavingsTransactionKind::Withdrawal),
        Just(SavingsTransactionKind::BudgetSurplus),
    ]
}

proptest! {
    /// For any accepted sequence of transactions the balance equals the
    /// fold of the signed ledger amounts and never goes negative.
    #[test]
    fn balance_is_fold_of_ledger(
        ops in prop::collection::vec((kind_strategy(), amount_strategy()), 1..50)
    ) {
        let target = dec!(1000);
        let mut status = GoalStatus::Active;
        let mut balance = Decimal::ZERO;
        let mut ledger = Vec::new();

        for (kind, amount) in ops {
            match apply_transaction(status, balance, target, kind, amount) {
                Ok(applied) => {
                    balance = applied.new_balance;
                    status = applied.new_status;
                    ledger.push(applied.signed_amount);
                }
                Err(SavingsError::InsufficientFunds { .. }) => {}
                Err(e) => return Err(TestCaseError::fail(format!("unexpected error: {e}"))),
            }
            prop_assert!(balance >= Decimal::ZERO);
        }

        prop_assert_eq!(balance_of(ledger), balance);
    }
}
