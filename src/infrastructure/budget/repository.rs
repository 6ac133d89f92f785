//! In-memory budget repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::budget::{Budget, BudgetId, BudgetRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of BudgetRepository, used for development and
/// tests. Enforces the same one-budget-per-user rule as the database's
/// unique index.
#[derive(Debug, Default)]
pub struct InMemoryBudgetRepository {
    budgets: Arc<RwLock<HashMap<String, Budget>>>,
    /// User ID -> budget ID lookup
    user_index: Arc<RwLock<HashMap<String, String>>>,
}

impl InMemoryBudgetRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BudgetRepository for InMemoryBudgetRepository {
    async fn get(&self, id: &BudgetId) -> Result<Option<Budget>, DomainError> {
        let budgets = self.budgets.read().await;
        Ok(budgets.get(id.as_str()).cloned())
    }

    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError> {
        let user_index = self.user_index.read().await;

        if let Some(budget_id) = user_index.get(user_id.as_str()) {
            let budgets = self.budgets.read().await;
            return Ok(budgets.get(budget_id).cloned());
        }

        Ok(None)
    }

    async fn create(&self, budget: Budget) -> Result<Budget, DomainError> {
        let mut budgets = self.budgets.write().await;
        let mut user_index = self.user_index.write().await;

        let id = budget.id().as_str().to_string();
        let user_id = budget.user_id().as_str().to_string();

        if budgets.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Budget with ID '{}' already exists",
                id
            )));
        }

        if user_index.contains_key(&user_id) {
            return Err(DomainError::conflict(format!(
                "User '{}' already has a budget",
                user_id
            )));
        }

        user_index.insert(user_id, id.clone());
        budgets.insert(id, budget.clone());

        Ok(budget)
    }

    async fn update(&self, budget: &Budget) -> Result<Budget, DomainError> {
        let mut budgets = self.budgets.write().await;

        let id = budget.id().as_str().to_string();

        if !budgets.contains_key(&id) {
            return Err(DomainError::not_found(format!(
                "Budget '{}' not found",
                id
            )));
        }

        budgets.insert(id, budget.clone());

        Ok(budget.clone())
    }

    async fn delete(&self, id: &BudgetId) -> Result<bool, DomainError> {
        let mut budgets = self.budgets.write().await;
        let mut user_index = self.user_index.write().await;

        if let Some(budget) = budgets.remove(id.as_str()) {
            user_index.remove(budget.user_id().as_str());
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
