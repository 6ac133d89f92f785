//! Budget infrastructure: repositories and the budget service.

mod postgres_repository;
mod repository;
mod service;

pub use postgres_repository::PostgresBudgetRepository;
pub use repository::InMemoryBudgetRepository;
pub use service::{BudgetService, BudgetUsageReport};
