//! Budget repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Budget, BudgetId};
use crate::domain::DomainError;
use crate::domain::user::UserId;

/// Repository trait for budget storage.
///
/// A user has at most one budget; `create` must reject a second one.
#[async_trait]
pub trait BudgetRepository: Send + Sync + Debug {
    /// Get a budget by its ID
    async fn get(&self, id: &BudgetId) -> Result<Option<Budget>, DomainError>;

    /// Get the budget owned by a user, if any
    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError>;

    /// Create a new budget
    async fn create(&self, budget: Budget) -> Result<Budget, DomainError>;

    /// Update an existing budget
    async fn update(&self, budget: &Budget) -> Result<Budget, DomainError>;

    /// Delete a budget
    async fn delete(&self, id: &BudgetId) -> Result<bool, DomainError>;

    /// Check if a user already has a budget
    async fn exists_for_user(&self, user_id: &UserId) -> Result<bool, DomainError> {
        Ok(self.get_by_user(user_id).await?.is_some())
    }
}
