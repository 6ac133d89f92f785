//! Subscription Tracker API
//!
//! A subscription and budget management backend with support for:
//! - Multi-currency pricing normalized into the home currency (TWD)
//! - Cached exchange rates with reference-table and pivot fallbacks
//! - Monthly budgets with usage analysis and recommendations
//! - JWT-authenticated REST API with per-user rate limiting

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use api::state::AppState;
use domain::ExchangeRateProvider;
use infrastructure::auth::{JwtConfig, JwtGenerator, JwtService};
use infrastructure::budget::{BudgetService, InMemoryBudgetRepository, PostgresBudgetRepository};
use infrastructure::clock::SystemClock;
use infrastructure::exchange_rate::{CachedExchangeRateService, HttpRateSource};
use infrastructure::rate_limit::RateLimiter;
use infrastructure::storage::{connect_pool, run_storage_migrations, StorageType};
use infrastructure::subscription::{
    InMemorySubscriptionRepository, PostgresSubscriptionRepository, SubscriptionService,
};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService,
};

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let storage_backend =
        StorageType::from_str(&config.storage.backend).unwrap_or(StorageType::InMemory);

    info!("Storage backend: {:?}", storage_backend);

    // The exchange rate cache and the rate limiter share one clock
    let clock = Arc::new(SystemClock);

    let ttl = Duration::seconds(config.exchange_rate.cache_ttl_secs as i64);
    let mut rate_service = CachedExchangeRateService::new(clock.clone(), ttl);

    if config.exchange_rate.upstream_enabled {
        info!(url = %config.exchange_rate.upstream_url, "Upstream rate feed enabled");
        rate_service = rate_service.with_source(Arc::new(HttpRateSource::new(
            config.exchange_rate.upstream_url.clone(),
        )));
    }

    let exchange_rates: Arc<dyn ExchangeRateProvider> = Arc::new(rate_service);
    let jwt = create_jwt_service(config);
    let hasher = Arc::new(Argon2Hasher::new());
    let rate_limiter = Arc::new(RateLimiter::new(config.rate_limit.clone(), clock));

    let state = match storage_backend {
        StorageType::Postgres => {
            info!("Connecting to PostgreSQL...");
            let pool = connect_pool(&config.storage.postgres).await?;
            run_storage_migrations(&pool).await?;
            info!("PostgreSQL connection established");

            let users = Arc::new(PostgresUserRepository::new(pool.clone()));
            let subscriptions = Arc::new(PostgresSubscriptionRepository::new(pool.clone()));
            let budgets = Arc::new(PostgresBudgetRepository::new(pool));

            AppState::new(
                Arc::new(UserService::new(users, hasher)),
                Arc::new(SubscriptionService::new(
                    subscriptions.clone(),
                    exchange_rates.clone(),
                )),
                Arc::new(BudgetService::new(budgets, subscriptions)),
                exchange_rates,
                jwt,
                rate_limiter,
            )
        }
        StorageType::InMemory => {
            info!("Using in-memory storage");

            let users = Arc::new(InMemoryUserRepository::new());
            let subscriptions = Arc::new(InMemorySubscriptionRepository::new());
            let budgets = Arc::new(InMemoryBudgetRepository::new());

            AppState::new(
                Arc::new(UserService::new(users, hasher)),
                Arc::new(SubscriptionService::new(
                    subscriptions.clone(),
                    exchange_rates.clone(),
                )),
                Arc::new(BudgetService::new(budgets, subscriptions)),
                exchange_rates,
                jwt,
                rate_limiter,
            )
        }
    };

    Ok(state)
}

/// Create the JWT service from the configured secret, the `JWT_SECRET`
/// environment variable, or a generated one
fn create_jwt_service(config: &AppConfig) -> Arc<dyn JwtGenerator> {
    let secret = config
        .auth
        .jwt_secret
        .clone()
        .or_else(|| std::env::var("JWT_SECRET").ok())
        .unwrap_or_else(|| {
            tracing::warn!(
                "No JWT secret configured. Generating a random one; \
                sessions will NOT persist across restarts. \
                Set JWT_SECRET or auth.jwt_secret for persistent sessions."
            );
            generate_random_secret()
        });

    Arc::new(JwtService::new(JwtConfig::new(
        secret,
        config.auth.jwt_expiration_hours,
    )))
}

/// Generate a random JWT secret
fn generate_random_secret() -> String {
    use rand::distributions::Alphanumeric;
    use rand::Rng;

    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_is_long_enough() {
        let secret = generate_random_secret();

        assert_eq!(secret.len(), 64);
        assert!(secret.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test]
    async fn test_create_app_state_defaults_to_memory() {
        let state = create_app_state().await.unwrap();

        // A fresh in-memory backend has no users
        let user = state.user_service.get("nobody").await.unwrap();
        assert!(user.is_none());
    }
}
