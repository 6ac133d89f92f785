//! PostgreSQL subscription repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::currency::Currency;
use crate::domain::subscription::{
    BillingCycle, Subscription, SubscriptionCategory, SubscriptionId, SubscriptionRepository,
};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of SubscriptionRepository
#[derive(Debug, Clone)]
pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "id, user_id, name, original_price, currency, price, \
                              cycle, category, start_date, is_active, created_at, updated_at";

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn get(&self, id: &SubscriptionId) -> Result<Option<Subscription>, DomainError> {
        let query = format!("SELECT {} FROM subscriptions WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query)
            .bind(id.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get subscription: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_subscription(&row)?)),
            None => Ok(None),
        }
    }

    async fn list_by_user(&self, user_id: &UserId) -> Result<Vec<Subscription>, DomainError> {
        let query = format!(
            "SELECT {} FROM subscriptions WHERE user_id = $1 ORDER BY created_at",
            SELECT_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user_id.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list subscriptions: {}", e)))?;

        let mut subscriptions = Vec::with_capacity(rows.len());

        for row in rows {
            subscriptions.push(row_to_subscription(&row)?);
        }

        Ok(subscriptions)
    }

    async fn create(&self, subscription: Subscription) -> Result<Subscription, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO subscriptions (id, user_id, name, original_price, currency, price,
                                       cycle, category, start_date, is_active,
                                       created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            "#,
        )
        .bind(subscription.id().as_str())
        .bind(subscription.user_id().as_str())
        .bind(subscription.name())
        .bind(subscription.original_price())
        .bind(subscription.currency().code())
        .bind(subscription.price())
        .bind(subscription.cycle().as_str())
        .bind(subscription.category().as_str())
        .bind(subscription.start_date())
        .bind(subscription.is_active())
        .bind(subscription.created_at())
        .bind(subscription.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                DomainError::conflict(format!(
                    "Subscription with ID '{}' already exists",
                    subscription.id().as_str()
                ))
            } else {
                DomainError::storage(format!("Failed to create subscription: {}", e))
            }
        })?;

        Ok(subscription)
    }

    async fn update(&self, subscription: &Subscription) -> Result<Subscription, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE subscriptions
            SET name = $2, original_price = $3, currency = $4, price = $5,
                cycle = $6, category = $7, start_date = $8, is_active = $9, updated_at = $10
            WHERE id = $1
            "#,
        )
        .bind(subscription.id().as_str())
        .bind(subscription.name())
        .bind(subscription.original_price())
        .bind(subscription.currency().code())
        .bind(subscription.price())
        .bind(subscription.cycle().as_str())
        .bind(subscription.category().as_str())
        .bind(subscription.start_date())
        .bind(subscription.is_active())
        .bind(subscription.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update subscription: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Subscription '{}' not found",
                subscription.id().as_str()
            )));
        }

        Ok(subscription.clone())
    }

    async fn delete(&self, id: &SubscriptionId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete subscription: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_subscription(row: &sqlx::postgres::PgRow) -> Result<Subscription, DomainError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let name: String = row.get("name");
    let original_price: f64 = row.get("original_price");
    let currency: String = row.get("currency");
    let price: f64 = row.get("price");
    let cycle: String = row.get("cycle");
    let category: String = row.get("category");
    let start_date: chrono::DateTime<chrono::Utc> = row.get("start_date");
    let is_active: bool = row.get("is_active");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let user_id = UserId::new(&user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(Subscription::from_parts(
        SubscriptionId::new(id),
        user_id,
        name,
        original_price,
        str_to_currency(&currency)?,
        price,
        str_to_cycle(&cycle)?,
        str_to_category(&category)?,
        start_date,
        is_active,
        created_at,
        updated_at,
    ))
}

// Unknown stored values mean the row was written by something newer or
// corrupted; fail loudly instead of defaulting.

fn str_to_currency(s: &str) -> Result<Currency, DomainError> {
    Currency::from_code(s)
        .ok_or_else(|| DomainError::internal(format!("Unknown currency '{}' in database", s)))
}

fn str_to_cycle(s: &str) -> Result<BillingCycle, DomainError> {
    match s {
        "monthly" => Ok(BillingCycle::Monthly),
        "quarterly" => Ok(BillingCycle::Quarterly),
        "yearly" => Ok(BillingCycle::Yearly),
        _ => Err(DomainError::internal(format!(
            "Unknown billing cycle '{}' in database",
            s
        ))),
    }
}

fn str_to_category(s: &str) -> Result<SubscriptionCategory, DomainError> {
    match s {
        "streaming" => Ok(SubscriptionCategory::Streaming),
        "software" => Ok(SubscriptionCategory::Software),
        "news" => Ok(SubscriptionCategory::News),
        "gaming" => Ok(SubscriptionCategory::Gaming),
        "music" => Ok(SubscriptionCategory::Music),
        "education" => Ok(SubscriptionCategory::Education),
        "productivity" => Ok(SubscriptionCategory::Productivity),
        "other" => Ok(SubscriptionCategory::Other),
        _ => Err(DomainError::internal(format!(
            "Unknown category '{}' in database",
            s
        ))),
    }
}
