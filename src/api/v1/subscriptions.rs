//! Subscription management endpoints

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{
    monthly_cost, next_billing_date, yearly_cost, BillingCycle, Currency, Subscription,
    SubscriptionCategory, SubscriptionPatch,
};
use crate::infrastructure::subscription::{
    BulkOperation, BulkOperationRequest, CreateSubscriptionRequest, SubscriptionSummary,
};

/// Create subscription request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscriptionApiRequest {
    pub name: String,
    pub original_price: f64,
    /// Currency code, matched case-insensitively
    pub currency: String,
    pub cycle: BillingCycle,
    pub category: SubscriptionCategory,
    /// Defaults to now when omitted
    pub start_date: Option<DateTime<Utc>>,
}

/// Update subscription request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateSubscriptionApiRequest {
    pub name: Option<String>,
    pub original_price: Option<f64>,
    pub currency: Option<String>,
    pub cycle: Option<BillingCycle>,
    pub category: Option<SubscriptionCategory>,
    pub start_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

/// Query parameters for listing subscriptions
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ListSubscriptionsQuery {
    pub include_inactive: bool,
    pub category: Option<SubscriptionCategory>,
}

/// Subscription response with computed cost fields
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub name: String,
    pub original_price: f64,
    pub currency: String,
    pub price: f64,
    pub cycle: BillingCycle,
    pub category: SubscriptionCategory,
    pub start_date: String,
    pub is_active: bool,
    pub monthly_cost: f64,
    pub yearly_cost: f64,
    pub next_billing_date: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Subscription> for SubscriptionResponse {
    fn from(subscription: &Subscription) -> Self {
        Self {
            id: subscription.id().to_string(),
            name: subscription.name().to_string(),
            original_price: subscription.original_price(),
            currency: subscription.currency().code().to_string(),
            price: subscription.price(),
            cycle: subscription.cycle(),
            category: subscription.category(),
            start_date: subscription.start_date().to_rfc3339(),
            is_active: subscription.is_active(),
            monthly_cost: monthly_cost(subscription),
            yearly_cost: yearly_cost(subscription),
            next_billing_date: next_billing_date(subscription).to_rfc3339(),
            created_at: subscription.created_at().to_rfc3339(),
            updated_at: subscription.updated_at().to_rfc3339(),
        }
    }
}

/// List subscriptions response
#[derive(Debug, Clone, Serialize)]
pub struct ListSubscriptionsResponse {
    pub subscriptions: Vec<SubscriptionResponse>,
    pub total: usize,
}

/// Aggregated summary response
#[derive(Debug, Clone, Serialize)]
pub struct SummaryResponse {
    pub total_subscriptions: usize,
    pub active_subscriptions: usize,
    pub total_monthly_cost: f64,
    pub total_yearly_cost: f64,
    pub categories: BTreeMap<SubscriptionCategory, f64>,
    pub upcoming_renewals: Vec<SubscriptionResponse>,
}

impl From<SubscriptionSummary> for SummaryResponse {
    fn from(summary: SubscriptionSummary) -> Self {
        Self {
            total_subscriptions: summary.total_subscriptions,
            active_subscriptions: summary.active_subscriptions,
            total_monthly_cost: summary.total_monthly_cost,
            total_yearly_cost: summary.total_yearly_cost,
            categories: summary.categories,
            upcoming_renewals: summary
                .upcoming_renewals
                .iter()
                .map(SubscriptionResponse::from)
                .collect(),
        }
    }
}

/// Bulk operation request
#[derive(Debug, Clone, Deserialize)]
pub struct BulkOperationApiRequest {
    pub subscription_ids: Vec<String>,
    pub operation: BulkOperation,
}

/// Bulk operation response
#[derive(Debug, Clone, Serialize)]
pub struct BulkOperationResponse {
    pub processed: usize,
}

fn parse_currency(code: &str) -> Result<Currency, ApiError> {
    Currency::from_code(code).ok_or_else(|| {
        ApiError::bad_request(format!("Unsupported currency: {}", code)).with_param("currency")
    })
}

/// GET /api/v1/subscriptions
pub async fn list_subscriptions(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Query(query): Query<ListSubscriptionsQuery>,
) -> Result<Json<ListSubscriptionsResponse>, ApiError> {
    debug!(user_id = %user.id(), "Listing subscriptions");

    let subscriptions = state
        .subscription_service
        .list(user.id(), query.include_inactive, query.category)
        .await
        .map_err(ApiError::from)?;

    let subscriptions: Vec<SubscriptionResponse> =
        subscriptions.iter().map(SubscriptionResponse::from).collect();
    let total = subscriptions.len();

    Ok(Json(ListSubscriptionsResponse {
        subscriptions,
        total,
    }))
}

/// POST /api/v1/subscriptions
pub async fn create_subscription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateSubscriptionApiRequest>,
) -> Result<(StatusCode, Json<SubscriptionResponse>), ApiError> {
    debug!(user_id = %user.id(), name = %request.name, "Creating subscription");

    let currency = parse_currency(&request.currency)?;

    let create_request = CreateSubscriptionRequest {
        name: request.name,
        original_price: request.original_price,
        currency,
        cycle: request.cycle,
        category: request.category,
        start_date: request.start_date.unwrap_or_else(Utc::now),
    };

    let subscription = state
        .subscription_service
        .create(user.id(), create_request)
        .await
        .map_err(ApiError::from)?;

    Ok((
        StatusCode::CREATED,
        Json(SubscriptionResponse::from(&subscription)),
    ))
}

/// GET /api/v1/subscriptions/summary
pub async fn get_summary(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<SummaryResponse>, ApiError> {
    debug!(user_id = %user.id(), "Building subscription summary");

    let summary = state
        .subscription_service
        .summary(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SummaryResponse::from(summary)))
}

/// GET /api/v1/subscriptions/{id}
pub async fn get_subscription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    debug!(user_id = %user.id(), subscription_id = %id, "Getting subscription");

    let subscription = state
        .subscription_service
        .get(user.id(), &id)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SubscriptionResponse::from(&subscription)))
}

/// PUT /api/v1/subscriptions/{id}
pub async fn update_subscription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateSubscriptionApiRequest>,
) -> Result<Json<SubscriptionResponse>, ApiError> {
    debug!(user_id = %user.id(), subscription_id = %id, "Updating subscription");

    let currency = request.currency.as_deref().map(parse_currency).transpose()?;

    let patch = SubscriptionPatch {
        name: request.name,
        original_price: request.original_price,
        currency,
        cycle: request.cycle,
        category: request.category,
        start_date: request.start_date,
        is_active: request.is_active,
    };

    let subscription = state
        .subscription_service
        .update(user.id(), &id, patch)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(SubscriptionResponse::from(&subscription)))
}

/// DELETE /api/v1/subscriptions/{id}
pub async fn delete_subscription(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user.id(), subscription_id = %id, "Deleting subscription");

    state
        .subscription_service
        .delete(user.id(), &id)
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/subscriptions/bulk
pub async fn bulk_operation(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<BulkOperationApiRequest>,
) -> Result<Json<BulkOperationResponse>, ApiError> {
    debug!(
        user_id = %user.id(),
        count = request.subscription_ids.len(),
        operation = ?request.operation,
        "Applying bulk operation"
    );

    let bulk_request = BulkOperationRequest {
        subscription_ids: request.subscription_ids,
        operation: request.operation,
    };

    let processed = state
        .subscription_service
        .bulk(user.id(), bulk_request)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BulkOperationResponse { processed }))
}
