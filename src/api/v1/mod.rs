//! Versioned API endpoints

pub mod budgets;
pub mod exchange_rates;
pub mod subscriptions;

use axum::{
    routing::{get, post, put},
    Router,
};

use super::state::AppState;

/// Create v1 API router
pub fn create_v1_router() -> Router<AppState> {
    Router::new()
        .route(
            "/subscriptions",
            get(subscriptions::list_subscriptions).post(subscriptions::create_subscription),
        )
        .route("/subscriptions/summary", get(subscriptions::get_summary))
        .route("/subscriptions/bulk", post(subscriptions::bulk_operation))
        .route(
            "/subscriptions/{id}",
            get(subscriptions::get_subscription)
                .put(subscriptions::update_subscription)
                .delete(subscriptions::delete_subscription),
        )
        .route(
            "/budgets",
            get(budgets::get_budget)
                .post(budgets::create_budget)
                .delete(budgets::delete_budget),
        )
        .route("/budgets/usage", get(budgets::get_usage))
        .route("/budgets/{id}", put(budgets::update_budget))
        .route("/exchange-rates/rates", get(exchange_rates::list_rates))
        .route(
            "/exchange-rates/currencies",
            get(exchange_rates::list_currencies),
        )
        .route(
            "/exchange-rates/convert",
            get(exchange_rates::convert_currency),
        )
}
