//! Hierarchical budget allocation and the adjustment ledger.
//!
//! A general monthly budget caps two independent allocation dimensions
//! (categories and payment methods). Every change to the general amount
//! is recorded in an append-only adjustment log whose folded deltas
//! always reproduce the live amount.

pub mod adjustment;
pub mod allocation;
pub mod error;
pub mod threshold;
pub mod types;


pub use adjustment::{AppliedAdjustment, apply_adjustment, replay_deltas, validate_reason};
pub use allocation::{AllocationCheck, validate_allocation};
pub use error::BudgetError;
pub use threshold::{Threshold, threshold_reached};
pub use types::{AdjustmentKind, AllocationDimension, BudgetOverview, MonthlyBudget, SubBudget};
