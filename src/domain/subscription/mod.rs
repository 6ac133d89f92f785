//! Subscription domain
//!
//! This module provides domain types for tracked subscriptions: the
//! subscription entity with its billing cycle and category, recurring
//! cost math, field validation, and the repository trait.

mod cost;
mod entity;
mod repository;
mod validation;

pub use cost::{
    category_costs, is_due_soon, monthly_cost, next_billing_date, total_monthly_cost,
    total_yearly_cost, yearly_cost,
};
pub use entity::{
    BillingCycle, Subscription, SubscriptionCategory, SubscriptionId, SubscriptionPatch,
};
pub use repository::SubscriptionRepository;
pub use validation::{
    validate_name, validate_price, validate_subscription_fields, SubscriptionValidationError,
    MAX_NAME_LENGTH,
};

#[cfg(test)]
pub use repository::mock::MockSubscriptionRepository;
