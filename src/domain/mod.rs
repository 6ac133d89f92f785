//! Domain layer - Core business logic and entities

pub mod budget;
pub mod currency;
pub mod error;
pub mod exchange_rate;
pub mod subscription;
pub mod user;
pub mod validation;

pub use budget::{
    budget_usage, category_budget_usage, recommendations, savings_potential, validate_budget_data,
    validate_monthly_limit, Budget, BudgetId, BudgetPatch, BudgetRepository, BudgetUsage,
    BudgetValidationError, CategoryBudgetUsage, CategoryUsage, SavingsPotential,
    MAX_MONTHLY_LIMIT,
};
pub use currency::{round2, Currency};
pub use error::DomainError;
pub use exchange_rate::ExchangeRateProvider;
pub use subscription::{
    category_costs, is_due_soon, monthly_cost, next_billing_date, total_monthly_cost,
    total_yearly_cost, validate_name, validate_price, validate_subscription_fields, yearly_cost,
    BillingCycle, Subscription, SubscriptionCategory, SubscriptionId, SubscriptionPatch,
    SubscriptionRepository, SubscriptionValidationError, MAX_NAME_LENGTH,
};
pub use user::{
    validate_password, validate_user_id, validate_username, User, UserId, UserRepository,
    UserStatus, UserValidationError,
};
pub use validation::ValidationReport;
