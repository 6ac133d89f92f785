//! Exchange rate domain
//!
//! Defines the provider contract the cost calculators depend on. The
//! concrete TTL-cached implementation lives in the infrastructure layer.

mod provider;

pub use provider::ExchangeRateProvider;

#[cfg(test)]
pub use provider::mock::MockExchangeRateProvider;
