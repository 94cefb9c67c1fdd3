//! Savings goal ledger and state machine.
//!
//! A goal's balance is never stored independently of its transaction
//! log: every committed balance is the fold of the signed transaction
//! amounts, which is what makes reconciliation possible.

pub mod error;
pub mod ledger;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::SavingsError;
pub use ledger::{apply_transaction, balance_of, completion_status, validate_target};
pub use types::{AppliedTransaction, GoalStatus, SavingsTransactionKind};
