//! Subscription repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Subscription, SubscriptionId};
use crate::domain::DomainError;
use crate::domain::user::UserId;

/// Repository trait for subscription storage
#[async_trait]
pub trait SubscriptionRepository: Send + Sync + Debug {
    /// Get a subscription by its ID
    async fn get(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError>;

    /// Get a subscription by ID, scoped to its owner.
    ///
    /// Returns `None` when the subscription does not exist OR belongs to
    /// a different user, so callers cannot tell the two cases apart.
    async fn get_for_user(
        &self,
        id: &SubscriptionId,
        user_id: &UserId,
    ) -> Result<Option<Subscription>, DomainError> {
        Ok(self
            .get(id)
            .await?
            .filter(|subscription| subscription.user_id() == user_id))
    }

    /// List all subscriptions owned by a user
    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError>;

    /// List only the active subscriptions owned by a user
    async fn list_active_by_user(
        &self,
        user_id: &UserId,
    ) -> Result<Vec<Subscription>, DomainError> {
        let subscriptions = self.list_by_user(user_id).await?;
        Ok(subscriptions
            .into_iter()
            .filter(|subscription| subscription.is_active())
            .collect())
    }

    /// Create a new subscription
    async fn create(&self, subscription: Subscription) -> Result<Subscription, DomainError>;

    /// Update an existing subscription
    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError>;

    /// Delete a subscription
    async fn delete(&self, id: &SubscriptionId) -> Result<bool, DomainError>;

    /// Check if a subscription ID exists
    async fn exists(&self, id: &SubscriptionId) -> Result<bool, DomainError> {
        Ok(self.get(id).await?.is_some())
    }
}
