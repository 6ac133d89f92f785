//! Exchange rate endpoints
//!
//! These serve global reference data and require no authentication; the
//! rate limiter still applies its read budget to them.

use std::collections::BTreeMap;

use axum::extract::{Query, State};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::Currency;

/// Query parameters for the rates listing
#[derive(Debug, Deserialize)]
pub struct RatesQuery {
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
}

fn default_base_currency() -> String {
    Currency::HOME.code().to_string()
}

/// Query parameters for currency conversion
#[derive(Debug, Deserialize)]
pub struct ConvertQuery {
    pub amount: f64,
    pub from_currency: String,
    pub to_currency: String,
}

/// Rates from a base currency to every other supported currency
#[derive(Debug, Clone, Serialize)]
pub struct RatesResponse {
    pub base_currency: String,
    pub rates: BTreeMap<String, f64>,
}

/// Supported currencies keyed by code
#[derive(Debug, Clone, Serialize)]
pub struct CurrenciesResponse {
    pub currencies: BTreeMap<String, String>,
}

/// Conversion result
#[derive(Debug, Clone, Serialize)]
pub struct ConversionResponse {
    pub original_amount: f64,
    pub converted_amount: f64,
    pub from_currency: String,
    pub to_currency: String,
    pub exchange_rate: f64,
}

fn parse_currency(code: &str, param: &str) -> Result<Currency, ApiError> {
    Currency::from_code(code).ok_or_else(|| {
        ApiError::bad_request(format!("Unsupported currency: {}", code)).with_param(param)
    })
}

/// GET /api/v1/exchange-rates/rates
pub async fn list_rates(
    State(state): State<AppState>,
    Query(query): Query<RatesQuery>,
) -> Result<Json<RatesResponse>, ApiError> {
    let base = parse_currency(&query.base_currency, "base_currency")?;

    debug!(base = %base, "Listing exchange rates");

    let rates = state
        .exchange_rates
        .rates_against(base)
        .await
        .into_iter()
        .map(|(currency, rate)| (currency.code().to_string(), rate))
        .collect();

    Ok(Json(RatesResponse {
        base_currency: base.code().to_string(),
        rates,
    }))
}

/// GET /api/v1/exchange-rates/currencies
pub async fn list_currencies() -> Json<CurrenciesResponse> {
    let currencies = Currency::ALL
        .iter()
        .map(|currency| {
            (
                currency.code().to_string(),
                currency.display_name().to_string(),
            )
        })
        .collect();

    Json(CurrenciesResponse { currencies })
}

/// GET /api/v1/exchange-rates/convert
pub async fn convert_currency(
    State(state): State<AppState>,
    Query(query): Query<ConvertQuery>,
) -> Result<Json<ConversionResponse>, ApiError> {
    let from = parse_currency(&query.from_currency, "from_currency")?;
    let to = parse_currency(&query.to_currency, "to_currency")?;

    debug!(amount = query.amount, from = %from, to = %to, "Converting currency");

    let converted_amount = state.exchange_rates.convert(query.amount, from, to).await;
    let exchange_rate = state.exchange_rates.get_rate(from, to).await;

    Ok(Json(ConversionResponse {
        original_amount: query.amount,
        converted_amount,
        from_currency: from.code().to_string(),
        to_currency: to.code().to_string(),
        exchange_rate,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_rates_query_defaults_to_home_currency() {
        let query: RatesQuery = serde_json::from_str("{}").unwrap();
        assert_eq!(query.base_currency, "TWD");
    }

    #[test]
    fn test_parse_currency_names_the_offending_param() {
        let error = parse_currency("XYZ", "to_currency").unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(error.response.error.param.as_deref(), Some("to_currency"));
    }

    #[tokio::test]
    async fn test_currencies_cover_every_supported_code() {
        let Json(response) = list_currencies().await;

        assert_eq!(response.currencies.len(), Currency::ALL.len());
        assert_eq!(
            response.currencies.get("TWD").map(String::as_str),
            Some("新台幣")
        );
        assert_eq!(
            response.currencies.get("JPY").map(String::as_str),
            Some("日圓")
        );
    }

    #[test]
    fn test_conversion_response_format() {
        let response = ConversionResponse {
            original_amount: 10.0,
            converted_amount: 315.0,
            from_currency: "USD".to_string(),
            to_currency: "TWD".to_string(),
            exchange_rate: 31.5,
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["original_amount"], 10.0);
        assert_eq!(json["converted_amount"], 315.0);
        assert_eq!(json["exchange_rate"], 31.5);
    }
}
