//! Shared domain types.

pub mod period;

pub use period::{Period, PeriodError};

/// Currency used when a request does not name one.
pub const DEFAULT_CURRENCY: &str = "PEN";
