//! Exchange rate provider trait

use std::collections::BTreeMap;
use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::currency::{round2, Currency};

/// Supplies spot conversion rates between supported currencies.
///
/// The provider is deliberately infallible: upstream outages degrade to
/// cached, pivoted or default values instead of surfacing errors, trading
/// accuracy for availability. Callers that need to distinguish a real rate
/// from the degraded default use [`try_get_rate`](Self::try_get_rate).
#[async_trait]
pub trait ExchangeRateProvider: Send + Sync + Debug {
    /// Spot rate from one currency to another. Always returns a usable
    /// value; `1.0` for equal currencies and as the degraded-mode default.
    async fn get_rate(&self, from: Currency, to: Currency) -> f64;

    /// Spot rate without the degraded default: `None` when the pair can
    /// only be served by the `1.0` fallback. Used as a validation-time
    /// probe before accepting a non-home-currency price.
    async fn try_get_rate(&self, from: Currency, to: Currency) -> Option<f64>;

    /// Convert an amount between currencies, rounded to currency minor
    /// units (2 decimal places). Converting to the same currency returns
    /// the amount untouched.
    async fn convert(&self, amount: f64, from: Currency, to: Currency) -> f64 {
        if from == to {
            return amount;
        }
        round2(amount * self.get_rate(from, to).await)
    }

    /// Rate from `base` to every other supported currency
    async fn rates_against(&self, base: Currency) -> BTreeMap<Currency, f64> {
        let mut rates = BTreeMap::new();
        for currency in Currency::ALL {
            if currency != base {
                rates.insert(currency, self.get_rate(base, currency).await);
            }
        }
        rates
    }
}
