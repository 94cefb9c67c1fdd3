//! `SeaORM` entity definitions.

pub mod budget_adjustments;
pub mod category_budgets;
pub mod expenses;
pub mod monthly_budgets;
pub mod payment_method_budgets;
pub mod savings_goals;
pub mod savings_transactions;
pub mod sea_orm_active_enums;
