//! Core business logic for Kakebo.
//!
//! This crate holds the budget allocation rules, the adjustment ledger
//! arithmetic, the alert threshold resolver, and the savings goal state
//! machine. It has no web or database dependencies; persistence layers
//! call into it and are responsible for atomicity.

pub mod budget;
pub mod savings;
