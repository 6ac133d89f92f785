//! In-memory subscription repository

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::subscription::{Subscription, SubscriptionId, SubscriptionRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// In-memory implementation of SubscriptionRepository, used for development
/// and tests
#[derive(Debug, Default)]
pub struct InMemorySubscriptionRepository {
    subscriptions: Arc<RwLock<HashMap<String, Subscription>>>,
}

impl InMemorySubscriptionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SubscriptionRepository for InMemorySubscriptionRepository {
    async fn get(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(id.as_str()).cloned())
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.subscriptions.read().await;

        let mut result: Vec<Subscription> = subscriptions
            .values()
            .filter(|s| s.user_id() == user_id)
            .cloned()
            .collect();

        // Stable listing order regardless of map iteration
        result.sort_by(|a, b| a.created_at().cmp(&b.created_at()));

        Ok(result)
    }

    async fn create(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;

        let id = subscription.id().as_str().to_string();

        if subscriptions.contains_key(&id) {
            return Err(DomainError::conflict(format!(
                "Subscription with ID '{}' already exists",
                id
            )));
        }

        subscriptions.insert(id, subscription.clone());

        Ok(subscription)
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;

        let id = subscription.id().as_str().to_string();

        if !subscriptions.contains_key(&id) {
            return Err(DomainError::not_found(format!(
                "Subscription '{}' not found",
                id
            )));
        }

        subscriptions.insert(id, subscription.clone());

        Ok(subscription.clone())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, DomainError> {
        let mut subscriptions = self.subscriptions.write().await;
        Ok(subscriptions.remove(id.as_str()).is_some())
    }
}
