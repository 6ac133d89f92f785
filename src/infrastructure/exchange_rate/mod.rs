//! Exchange rate infrastructure: cached provider and upstream source.

mod service;
mod source;

pub use service::CachedExchangeRateService;
pub use source::{HttpRateSource, RateSource};

#[cfg(test)]
pub use source::MockRateSource;
