//! Subscription service coordinating validation, currency normalization,
//! and persistence

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::domain::currency::Currency;
use crate::domain::subscription::{
    category_costs, is_due_soon, total_monthly_cost, total_yearly_cost, validate_name,
    validate_price, validate_subscription_fields, BillingCycle, Subscription,
    SubscriptionCategory, SubscriptionId, SubscriptionPatch, SubscriptionRepository,
};
use crate::domain::user::UserId;
use crate::domain::{DomainError, ExchangeRateProvider, ValidationReport};

/// Days ahead a renewal counts as upcoming in the summary
const RENEWAL_WINDOW_DAYS: i64 = 7;

/// Request for creating a new subscription
#[derive(Debug, Clone)]
pub struct CreateSubscriptionRequest {
    pub name: String,
    pub original_price: f64,
    pub currency: Currency,
    pub cycle: BillingCycle,
    pub category: SubscriptionCategory,
    pub start_date: DateTime<Utc>,
}

/// Operation applied to a batch of subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BulkOperation {
    Activate,
    Deactivate,
    Delete,
}

/// Request for a bulk operation over the caller's subscriptions
#[derive(Debug, Clone)]
pub struct BulkOperationRequest {
    pub subscription_ids: Vec<String>,
    pub operation: BulkOperation,
}

/// Aggregated view of a user's subscriptions
#[derive(Debug, Clone)]
pub struct SubscriptionSummary {
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    pub categories: BTreeMap<SubscriptionCategory, f64>,
    pub upcoming_renewals: Vec<Subscription>,
}

/// Subscription service for CRUD, bulk operations, and summaries
#[derive(Debug)]
pub struct SubscriptionService<R: SubscriptionRepository> {
    repository: Arc<R>,
    provider: Arc<dyn ExchangeRateProvider>,
}

impl<R: SubscriptionRepository> SubscriptionService<R> {
    pub fn new(repository: Arc<R>, provider: Arc<dyn ExchangeRateProvider>) -> Self {
        Self {
            repository,
            provider,
        }
    }

    /// Validate subscription input, collecting every violation.
    ///
    /// For non-home currencies the rate for the pair must actually resolve;
    /// a pair running on the degraded 1:1 default is reported as an error
    /// rather than silently accepted.
    pub async fn validate_subscription_data(
        &self,
        name: &str,
        price: f64,
        currency: Currency,
    ) -> ValidationReport {
        let mut report = validate_subscription_fields(name, price);

        if currency != Currency::HOME
            && self
                .provider
                .try_get_rate(currency, Currency::HOME)
                .await
                .is_none()
        {
            report.push(format!(
                "Cannot fetch exchange rate for {} to {}",
                currency.code(),
                Currency::HOME.code()
            ));
        }

        report
    }

    /// Normalize an amount into the home currency
    pub async fn twd_price(&self, original_price: f64, currency: Currency) -> f64 {
        if currency == Currency::HOME {
            return original_price;
        }

        self.provider
            .convert(original_price, currency, Currency::HOME)
            .await
    }

    /// Create a subscription after validating and pricing it
    pub async fn create(
        &self,
        user_id: &UserId,
        request: CreateSubscriptionRequest,
    ) -> Result<Subscription, DomainError> {
        self.validate_subscription_data(&request.name, request.original_price, request.currency)
            .await
            .into_result()?;

        let price = self.twd_price(request.original_price, request.currency).await;

        let subscription = Subscription::new(
            SubscriptionId::generate(),
            user_id.clone(),
            request.name,
            request.original_price,
            request.currency,
            price,
            request.cycle,
            request.category,
            request.start_date,
        );

        self.repository.create(subscription).await
    }

    /// List the user's subscriptions, active-only unless `include_inactive`
    pub async fn list(
        &self,
        user_id: &UserId,
        include_inactive: bool,
        category: Option<SubscriptionCategory>,
    ) -> Result<Vec<Subscription>, DomainError> {
        let mut subscriptions = if include_inactive {
            self.repository.list_by_user(user_id).await?
        } else {
            self.repository.list_active_by_user(user_id).await?
        };

        if let Some(category) = category {
            subscriptions.retain(|s| s.category() == category);
        }

        Ok(subscriptions)
    }

    /// Get one of the user's subscriptions
    pub async fn get(&self, user_id: &UserId, id: &str) -> Result<Subscription, DomainError> {
        self.repository
            .get_for_user(&SubscriptionId::from(id), user_id)
            .await?
            .ok_or_else(|| DomainError::not_found(format!("Subscription '{}' not found", id)))
    }

    /// Apply a patch, repricing the home-currency snapshot when the amount
    /// or currency changed
    pub async fn update(
        &self,
        user_id: &UserId,
        id: &str,
        patch: SubscriptionPatch,
    ) -> Result<Subscription, DomainError> {
        let mut subscription = self.get(user_id, id).await?;

        let mut report = ValidationReport::new();
        if let Some(name) = &patch.name {
            report.record(validate_name(name));
        }
        if let Some(price) = patch.original_price {
            report.record(validate_price(price));
        }
        report.into_result()?;

        let reprice = patch.affects_price();
        subscription.apply(&patch);

        if reprice {
            let price = self
                .twd_price(subscription.original_price(), subscription.currency())
                .await;
            subscription.set_price(price);
        }

        self.repository.update(&subscription).await
    }

    /// Delete one of the user's subscriptions
    pub async fn delete(&self, user_id: &UserId, id: &str) -> Result<(), DomainError> {
        let subscription = self.get(user_id, id).await?;
        self.repository.delete(subscription.id()).await?;
        Ok(())
    }

    /// Apply one operation to many subscriptions, skipping ids that do not
    /// belong to the caller. Returns the number processed.
    pub async fn bulk(
        &self,
        user_id: &UserId,
        request: BulkOperationRequest,
    ) -> Result<usize, DomainError> {
        let mut processed = 0;

        for id in &request.subscription_ids {
            let mut subscription = match self
                .repository
                .get_for_user(&SubscriptionId::from(id.as_str()), user_id)
                .await?
            {
                Some(subscription) => subscription,
                None => continue,
            };

            match request.operation {
                BulkOperation::Activate => {
                    subscription.activate();
                    self.repository.update(&subscription).await?;
                }
                BulkOperation::Deactivate => {
                    subscription.deactivate();
                    self.repository.update(&subscription).await?;
                }
                BulkOperation::Delete => {
                    self.repository.delete(subscription.id()).await?;
                }
            }

            processed += 1;
        }

        Ok(processed)
    }

    /// Aggregate totals, per-category costs, and imminent renewals
    pub async fn summary(&self, user_id: &UserId) -> Result<SubscriptionSummary, DomainError> {
        let subscriptions = self.repository.list_by_user(user_id).await?;

        let now = Utc::now();
        let upcoming_renewals: Vec<Subscription> = subscriptions
            .iter()
            .filter(|s| s.is_active() && is_due_soon(s, now, RENEWAL_WINDOW_DAYS))
            .cloned()
            .collect();

        let active_subscriptions = subscriptions.iter().filter(|s| s.is_active()).count();

        Ok(SubscriptionSummary {
            total_subscriptions: subscriptions.len(),
            active_subscriptions,
            total_monthly_cost: total_monthly_cost(&subscriptions),
            total_yearly_cost: total_yearly_cost(&subscriptions),
            categories: category_costs(&subscriptions),
            upcoming_renewals,
        })
    }
}
