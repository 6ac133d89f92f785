//! Budget domain
//!
//! This module provides the budget entity, its validation rules, the
//! repository trait, and the pure usage-analysis functions that turn a
//! budget plus a set of subscriptions into usage figures and
//! recommendations.

mod analyzer;
mod entity;
mod repository;
mod validation;

pub use analyzer::{
    budget_usage, category_budget_usage, recommendations, savings_potential, BudgetUsage,
    CategoryBudgetUsage, CategoryUsage, SavingsPotential,
};
pub use entity::{Budget, BudgetId, BudgetPatch};
pub use repository::BudgetRepository;
pub use validation::{
    validate_budget_data, validate_monthly_limit, BudgetValidationError, MAX_MONTHLY_LIMIT,
};

#[cfg(test)]
pub use repository::mock::MockBudgetRepository;
