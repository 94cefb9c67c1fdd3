//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the
//! application. Every validate-then-write sequence runs inside a
//! transaction that locks the relevant parent row, so concurrent
//! mutations serialize instead of passing stale-state validation.

pub mod budget;
pub mod expense;
pub mod savings;

pub use budget::{
    AdjustmentOutcome, BudgetError, BudgetRepository, SetAmountInput, UpsertSubBudgetInput,
};
pub use expense::{ExpenseRepository, SpendDimension};
pub use savings::{
    CreateGoalInput, SavingsError, SavingsRepository, SpendFromSavingsInput,
    SpendFromSavingsOutcome, TransactionOutcome,
};
