//! Upstream exchange rate source

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use std::fmt::Debug;
use std::time::Duration;

#[cfg(test)]
use mockall::automock;

use crate::domain::currency::Currency;
use crate::domain::DomainError;

/// Upstream feed of spot exchange rates
#[cfg_attr(test, automock)]
#[async_trait]
pub trait RateSource: Send + Sync {
    /// Fetch the current rate for a currency pair
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<f64, DomainError>;
}

/// How long to wait for the upstream feed before giving up
const UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);

/// Shape of the upstream `/latest` response
#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: HashMap<String, f64>,
}

/// Rate source backed by an exchangerate-style HTTP JSON feed
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpRateSource {
    /// Create a source pointed at the given feed base URL
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(UPSTREAM_TIMEOUT)
                .build()
                .expect("Failed to build HTTP client"),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RateSource for HttpRateSource {
    async fn fetch_rate(&self, from: Currency, to: Currency) -> Result<f64, DomainError> {
        let url = format!(
            "{}/latest?base={}&symbols={}",
            self.base_url.trim_end_matches('/'),
            from.code(),
            to.code()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DomainError::provider(format!("Rate request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(DomainError::provider(format!(
                "Rate feed returned HTTP {}",
                response.status()
            )));
        }

        let body: RatesResponse = response
            .json()
            .await
            .map_err(|e| DomainError::provider(format!("Failed to parse rate response: {}", e)))?;

        body.rates
            .get(to.code())
            .copied()
            .ok_or_else(|| DomainError::provider(format!("Rate feed has no {} rate", to)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_fetch_rate() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .and(query_param("base", "USD"))
            .and(query_param("symbols", "TWD"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "base": "USD",
                "rates": { "TWD": 31.5 }
            })))
            .mount(&server)
            .await;

        let source = HttpRateSource::new(server.uri());
        let rate = source.fetch_rate(Currency::Usd, Currency::Twd).await.unwrap();

        assert_eq!(rate, 31.5);
    }

    #[tokio::test]
    async fn test_fetch_rate_upstream_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let source = HttpRateSource::new(server.uri());
        let result = source.fetch_rate(Currency::Usd, Currency::Twd).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_fetch_rate_missing_symbol() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/latest"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "base": "USD",
                "rates": {}
            })))
            .mount(&server)
            .await;

        let source = HttpRateSource::new(server.uri());
        let result = source.fetch_rate(Currency::Usd, Currency::Twd).await;

        assert!(result.is_err());
    }
}
