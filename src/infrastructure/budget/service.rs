//! Budget service coordinating validation, the one-budget-per-user rule,
//! and usage analysis

use std::sync::Arc;

use crate::domain::budget::{
    budget_usage, category_budget_usage, recommendations, savings_potential,
    validate_budget_data, Budget, BudgetId, BudgetPatch, BudgetRepository, BudgetUsage,
    CategoryBudgetUsage, SavingsPotential,
};
use crate::domain::subscription::SubscriptionRepository;
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// Combined usage view served by the budget usage endpoint
#[derive(Debug, Clone)]
pub struct BudgetUsageReport {
    pub budget: Option<Budget>,
    pub usage: BudgetUsage,
    pub category_usage: CategoryBudgetUsage,
    pub recommendations: Vec<String>,
    pub savings_potential: SavingsPotential,
}

/// Budget service for CRUD and usage reporting
#[derive(Debug)]
pub struct BudgetService<B: BudgetRepository, S: SubscriptionRepository> {
    budgets: Arc<B>,
    subscriptions: Arc<S>,
}

impl<B: BudgetRepository, S: SubscriptionRepository> BudgetService<B, S> {
    pub fn new(budgets: Arc<B>, subscriptions: Arc<S>) -> Self {
        Self {
            budgets,
            subscriptions,
        }
    }

    /// Create the user's budget; each user can have at most one
    pub async fn create(
        &self,
        user_id: &UserId,
        monthly_limit: f64,
    ) -> Result<Budget, DomainError> {
        validate_budget_data(monthly_limit).into_result()?;

        if self.budgets.exists_for_user(user_id).await? {
            return Err(DomainError::conflict(
                "User already has a budget; use update instead",
            ));
        }

        let budget = Budget::new(BudgetId::generate(), user_id.clone(), monthly_limit);

        self.budgets.create(budget).await
    }

    /// Get the user's budget, if one is set
    pub async fn get(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError> {
        self.budgets.get_by_user(user_id).await
    }

    /// Update the user's budget. The path id must match the budget the user
    /// owns; a mismatch is a permission error, not a lookup miss.
    pub async fn update(
        &self,
        user_id: &UserId,
        budget_id: &str,
        patch: BudgetPatch,
    ) -> Result<Budget, DomainError> {
        let mut budget = self
            .budgets
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Budget not found"))?;

        if budget.id().as_str() != budget_id {
            return Err(DomainError::forbidden("No permission to modify this budget"));
        }

        if let Some(monthly_limit) = patch.monthly_limit {
            validate_budget_data(monthly_limit).into_result()?;
        }

        budget.apply(&patch);

        self.budgets.update(&budget).await
    }

    /// Delete the user's budget
    pub async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        let budget = self
            .budgets
            .get_by_user(user_id)
            .await?
            .ok_or_else(|| DomainError::not_found("Budget not found"))?;

        self.budgets.delete(budget.id()).await?;

        Ok(())
    }

    /// Usage figures, per-category breakdown, recommendations, and savings
    /// potential over the user's active subscriptions
    pub async fn usage(&self, user_id: &UserId) -> Result<BudgetUsageReport, DomainError> {
        let budget = self.budgets.get_by_user(user_id).await?;
        let subscriptions = self.subscriptions.list_active_by_user(user_id).await?;

        Ok(BudgetUsageReport {
            usage: budget_usage(budget.as_ref(), &subscriptions),
            category_usage: category_budget_usage(budget.as_ref(), &subscriptions),
            recommendations: recommendations(budget.as_ref(), &subscriptions),
            savings_potential: savings_potential(&subscriptions),
            budget,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::budget::MockBudgetRepository;
    use crate::domain::currency::Currency;
    use crate::domain::subscription::{
        BillingCycle, MockSubscriptionRepository, Subscription, SubscriptionCategory,
        SubscriptionId,
    };
    use chrono::Utc;

    fn user() -> UserId {
        UserId::new("user-1").unwrap()
    }

    fn make_subscription(id: &str, price: f64) -> Subscription {
        Subscription::new(
            SubscriptionId::new(id),
            user(),
            "Netflix",
            price,
            Currency::Twd,
            price,
            BillingCycle::Monthly,
            SubscriptionCategory::Streaming,
            Utc::now(),
        )
    }

    fn create_service() -> BudgetService<MockBudgetRepository, MockSubscriptionRepository> {
        BudgetService::new(
            Arc::new(MockBudgetRepository::new()),
            Arc::new(MockSubscriptionRepository::new()),
        )
    }

    #[tokio::test]
    async fn test_create_budget() {
        let service = create_service();

        let budget = service.create(&user(), 1000.0).await.unwrap();

        assert_eq!(budget.monthly_limit(), 1000.0);
        assert_eq!(budget.user_id(), &user());
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_limit() {
        let service = create_service();

        let error = service.create(&user(), -100.0).await.unwrap_err();

        assert!(error
            .to_string()
            .contains("Monthly limit must be greater than 0"));
    }

    #[tokio::test]
    async fn test_create_rejects_second_budget() {
        let service = create_service();

        service.create(&user(), 1000.0).await.unwrap();

        let result = service.create(&user(), 2000.0).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
    }

    #[tokio::test]
    async fn test_get_returns_none_without_budget() {
        let service = create_service();

        assert!(service.get(&user()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_budget() {
        let service = create_service();

        let budget = service.create(&user(), 1000.0).await.unwrap();

        let updated = service
            .update(
                &user(),
                budget.id().as_str(),
                BudgetPatch {
                    monthly_limit: Some(1500.0),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.monthly_limit(), 1500.0);
    }

    #[tokio::test]
    async fn test_update_missing_budget_is_not_found() {
        let service = create_service();

        let result = service
            .update(
                &user(),
                "budget-1",
                BudgetPatch {
                    monthly_limit: Some(1500.0),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_foreign_budget_id_is_forbidden() {
        let service = create_service();

        service.create(&user(), 1000.0).await.unwrap();

        let result = service
            .update(
                &user(),
                "some-other-budget-id",
                BudgetPatch {
                    monthly_limit: Some(1500.0),
                },
            )
            .await;

        assert!(matches!(result, Err(DomainError::Forbidden { .. })));
    }

    #[tokio::test]
    async fn test_update_rejects_invalid_limit() {
        let service = create_service();

        let budget = service.create(&user(), 1000.0).await.unwrap();

        let result = service
            .update(
                &user(),
                budget.id().as_str(),
                BudgetPatch {
                    monthly_limit: Some(2_000_000.0),
                },
            )
            .await;

        let error = result.unwrap_err().to_string();
        assert!(error.contains("1,000,000"));
    }

    #[tokio::test]
    async fn test_delete_budget() {
        let service = create_service();

        service.create(&user(), 1000.0).await.unwrap();
        service.delete(&user()).await.unwrap();

        assert!(service.get(&user()).await.unwrap().is_none());

        // A second delete has nothing to remove
        let result = service.delete(&user()).await;
        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_usage_without_budget_suggests_setting_one() {
        let service = create_service();

        let report = service.usage(&user()).await.unwrap();

        assert!(report.budget.is_none());
        assert_eq!(report.usage.total_budget, 0.0);
        assert!(!report.usage.is_over_budget);
        assert_eq!(
            report.recommendations,
            ["Set a monthly budget limit to better manage subscription spending"]
        );
    }

    #[tokio::test]
    async fn test_usage_over_budget() {
        let budgets = Arc::new(MockBudgetRepository::new());
        let subscriptions = Arc::new(MockSubscriptionRepository::new());
        let service = BudgetService::new(Arc::clone(&budgets), Arc::clone(&subscriptions));

        service.create(&user(), 1000.0).await.unwrap();
        subscriptions
            .create(make_subscription("sub-1", 1200.0))
            .await
            .unwrap();

        let report = service.usage(&user()).await.unwrap();

        assert!(report.usage.is_over_budget);
        assert_eq!(report.usage.used_amount, 1200.0);
        assert_eq!(report.usage.over_budget_amount, 200.0);
        assert_eq!(report.usage.usage_percentage, 120.0);
        assert!(report.recommendations[0].contains("200.00"));
    }

    #[tokio::test]
    async fn test_usage_ignores_inactive_subscriptions() {
        let budgets = Arc::new(MockBudgetRepository::new());
        let subscriptions = Arc::new(MockSubscriptionRepository::new());
        let service = BudgetService::new(Arc::clone(&budgets), Arc::clone(&subscriptions));

        service.create(&user(), 1000.0).await.unwrap();

        let mut paused = make_subscription("sub-1", 1200.0);
        paused.deactivate();
        subscriptions.create(paused).await.unwrap();

        let report = service.usage(&user()).await.unwrap();

        assert_eq!(report.usage.used_amount, 0.0);
        assert!(!report.usage.is_over_budget);
    }
}
