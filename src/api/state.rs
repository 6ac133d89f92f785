//! Application state for shared services

use std::sync::Arc;

use crate::domain::budget::BudgetRepository;
use crate::domain::subscription::SubscriptionRepository;
use crate::domain::user::UserRepository;
use crate::domain::{
    Budget, BudgetPatch, DomainError, ExchangeRateProvider, Subscription, SubscriptionCategory,
    SubscriptionPatch, User, UserId,
};
use crate::infrastructure::auth::JwtGenerator;
use crate::infrastructure::budget::{BudgetService, BudgetUsageReport};
use crate::infrastructure::rate_limit::RateLimiter;
use crate::infrastructure::subscription::{
    BulkOperationRequest, CreateSubscriptionRequest, SubscriptionService, SubscriptionSummary,
};
use crate::infrastructure::user::{
    PasswordHasher, RegisterUserRequest, UpdatePasswordRequest, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub subscription_service: Arc<dyn SubscriptionServiceTrait>,
    pub budget_service: Arc<dyn BudgetServiceTrait>,
    pub exchange_rates: Arc<dyn ExchangeRateProvider>,
    pub jwt: Arc<dyn JwtGenerator>,
    pub rate_limiter: Arc<RateLimiter>,
}

/// Trait for user account operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError>;
    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError>;
    async fn get(&self, id: &str) -> Result<Option<User>, DomainError>;
    async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError>;
}

/// Trait for subscription operations
#[async_trait::async_trait]
pub trait SubscriptionServiceTrait: Send + Sync {
    async fn create(
        &self,
        user_id: &UserId,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, DomainError>;
    async fn list(
        &self,
        user_id: &UserId,
        include_inactive: bool,
        category: Option<SubscriptionCategory>,
    ) -> Result<Vec<Subscription>, DomainError>;
    async fn get(&self, user_id: &UserId, id: &str) -> Result<Subscription, DomainError>;
    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, DomainError>;
    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), DomainError>;
    async fn bulk(
        &self,
        user_id: &UserId,
        request: BulkOperationRequest,
    ) -> Result<usize, DomainError>;
    async fn summary(&self, user_id: &UserId) -> Result<SubscriptionSummary, DomainError>;
}

/// Trait for budget operations
#[async_trait::async_trait]
pub trait BudgetServiceTrait: Send + Sync {
    async fn create(&self, user_id: &UserId, monthly_limit: f64) -> Result<Budget, DomainError>;
    async fn get(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError>;
    async fn update(
        &self,
        user_id: &UserId,
        budget_id: &str,
        patch: BudgetPatch,
    ) -> Result<Budget, DomainError>;
    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError>;
    async fn usage(&self, user_id: &UserId) -> Result<BudgetUsageReport, DomainError>;
}

// Implement traits for the actual services

#[async_trait::async_trait]
impl<R: UserRepository + 'static, H: PasswordHasher + 'static> UserServiceTrait
    for UserService<R, H>
{
    async fn register(&self, request: RegisterUserRequest) -> Result<User, DomainError> {
        UserService::register(self, request).await
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<User, DomainError> {
        UserService::authenticate(self, username, password).await
    }

    async fn get(&self, id: &str) -> Result<Option<User>, DomainError> {
        UserService::get(self, id).await
    }

    async fn update_password(
        &self,
        id: &str,
        request: UpdatePasswordRequest,
    ) -> Result<User, DomainError> {
        UserService::update_password(self, id, request).await
    }
}

#[async_trait::async_trait]
impl<R: SubscriptionRepository + 'static> SubscriptionServiceTrait for SubscriptionService<R> {
    async fn create(
        &self,
        user_id: &UserId,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, DomainError> {
        SubscriptionService::create(self, user_id, request).await
    }

    async fn list(
        &self,
        user_id: &UserId,
        include_inactive: bool,
        category: Option<SubscriptionCategory>,
    ) -> Result<Vec<Subscription>, DomainError> {
        SubscriptionService::list(self, user_id, include_inactive, category).await
    }

    async fn get(&self, user_id: &UserId, id: &str) -> Result<Subscription, DomainError> {
        SubscriptionService::get(self, user_id, id).await
    }

    async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, DomainError> {
        SubscriptionService::update(self, user_id, id, patch).await
    }

    async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), DomainError> {
        SubscriptionService::delete(self, user_id, id).await
    }

    async fn bulk(
        &self,
        user_id: &UserId,
        request: BulkOperationRequest,
    ) -> Result<usize, DomainError> {
        SubscriptionService::bulk(self, user_id, request).await
    }

    async fn summary(&self, user_id: &UserId) -> Result<SubscriptionSummary, DomainError> {
        SubscriptionService::summary(self, user_id).await
    }
}

#[async_trait::async_trait]
impl<B: BudgetRepository + 'static, S: SubscriptionRepository + 'static> BudgetServiceTrait
    for BudgetService<B, S>
{
    async fn create(&self, user_id: &UserId, monthly_limit: f64) -> Result<Budget, DomainError> {
        BudgetService::create(self, user_id, monthly_limit).await
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError> {
        BudgetService::get(self, user_id).await
    }

    async fn update(
        &self,
        user_id: &UserId,
        budget_id: &str,
        patch: BudgetPatch,
    ) -> Result<Budget, DomainError> {
        BudgetService::update(self, user_id, budget_id, patch).await
    }

    async fn delete(&self, user_id: &UserId) -> Result<(), DomainError> {
        BudgetService::delete(self, user_id).await
    }

    async fn usage(&self, user_id: &UserId) -> Result<BudgetUsageReport, DomainError> {
        BudgetService::usage(self, user_id).await
    }
}

impl AppState {
    /// Create new application state with provided services
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        subscription_service: Arc<dyn SubscriptionServiceTrait>,
        budget_service: Arc<dyn BudgetServiceTrait>,
        exchange_rates: Arc<dyn ExchangeRateProvider>,
        jwt: Arc<dyn JwtGenerator>,
        rate_limiter: Arc<RateLimiter>,
    ) -> Self {
        Self {
            user_service,
            subscription_service,
            budget_service,
            exchange_rates,
            jwt,
            rate_limiter,
        }
    }
}
