//! Cached exchange rate provider.
//!
//! Rates are resolved in order: fresh cache, upstream source (when one is
//! configured), built-in reference table, and finally a cross-rate pivot
//! through [`Currency::HOME`]. When nothing resolves the provider degrades
//! to a 1:1 rate so cost calculations keep working.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use tokio::sync::RwLock;

use crate::domain::{Currency, ExchangeRateProvider};
use crate::infrastructure::clock::Clock;
use crate::infrastructure::observability::{record_rate_lookup, RateLookupSource};

use super::source::RateSource;

/// Rate applied when a pair cannot be resolved from any source.
const DEFAULT_RATE: f64 = 1.0;

/// Reference rates against the home currency, used when no upstream source
/// is configured or the upstream is unreachable and the cache is empty.
static REFERENCE_RATES: Lazy<HashMap<(Currency, Currency), f64>> = Lazy::new(|| {
    HashMap::from([
        ((Currency::Usd, Currency::Twd), 31.5),
        ((Currency::Eur, Currency::Twd), 34.2),
        ((Currency::Jpy, Currency::Twd), 0.22),
        ((Currency::Gbp, Currency::Twd), 39.8),
        ((Currency::Krw, Currency::Twd), 0.024),
        ((Currency::Cny, Currency::Twd), 4.35),
    ])
});

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    rate: f64,
    fetched_at: DateTime<Utc>,
}

/// Exchange rate provider backed by an in-memory cache with a TTL.
pub struct CachedExchangeRateService {
    cache: RwLock<HashMap<(Currency, Currency), CacheEntry>>,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    source: Option<Arc<dyn RateSource>>,
    reference: HashMap<(Currency, Currency), f64>,
}

impl CachedExchangeRateService {
    /// Creates a service with no upstream source; rates come from the
    /// reference table and the cache only.
    pub fn new(clock: Arc<dyn Clock>, ttl: Duration) -> Self {
        Self {
            cache: RwLock::new(HashMap::new()),
            ttl,
            clock,
            source: None,
            reference: REFERENCE_RATES.clone(),
        }
    }

    /// Attaches an upstream rate source, consulted before the reference table.
    pub fn with_source(mut self, source: Arc<dyn RateSource>) -> Self {
        self.source = Some(source);
        self
    }

    /// Replaces the built-in reference table.
    pub fn with_reference_rates(mut self, reference: HashMap<(Currency, Currency), f64>) -> Self {
        self.reference = reference;
        self
    }

    fn is_fresh(&self, entry: &CacheEntry) -> bool {
        self.clock.now() - entry.fetched_at < self.ttl
    }

    /// Returns the cached rate for a pair. Expired entries are only returned
    /// when `allow_stale` is set, which happens after an upstream failure.
    async fn cached_rate(&self, from: Currency, to: Currency, allow_stale: bool) -> Option<f64> {
        let cache = self.cache.read().await;
        let entry = cache.get(&(from, to))?;

        if allow_stale || self.is_fresh(entry) {
            Some(entry.rate)
        } else {
            None
        }
    }

    async fn store(&self, from: Currency, to: Currency, rate: f64) {
        let entry = CacheEntry {
            rate,
            fetched_at: self.clock.now(),
        };

        self.cache.write().await.insert((from, to), entry);
    }

    fn reference_rate(&self, from: Currency, to: Currency) -> Option<f64> {
        if let Some(rate) = self.reference.get(&(from, to)) {
            return Some(*rate);
        }

        self.reference.get(&(to, from)).map(|rate| 1.0 / rate)
    }

    /// Resolves a pair without pivoting: cache, then upstream, then the
    /// reference table. Resolved rates are written back to the cache.
    async fn direct_rate(&self, from: Currency, to: Currency) -> Option<f64> {
        if let Some(rate) = self.cached_rate(from, to, false).await {
            record_rate_lookup(from, to, RateLookupSource::Cache);
            return Some(rate);
        }

        if let Some(source) = &self.source {
            match source.fetch_rate(from, to).await {
                Ok(rate) => {
                    self.store(from, to, rate).await;
                    record_rate_lookup(from, to, RateLookupSource::Upstream);
                    return Some(rate);
                }
                Err(error) => {
                    tracing::warn!(
                        %from,
                        %to,
                        %error,
                        "Upstream rate fetch failed, trying stale cache"
                    );

                    if let Some(rate) = self.cached_rate(from, to, true).await {
                        tracing::debug!(%from, %to, rate, "Using stale cached rate");
                        record_rate_lookup(from, to, RateLookupSource::StaleCache);
                        return Some(rate);
                    }
                }
            }
        }

        if let Some(rate) = self.reference_rate(from, to) {
            self.store(from, to, rate).await;
            record_rate_lookup(from, to, RateLookupSource::Reference);
            return Some(rate);
        }

        None
    }

    /// Resolves a pair, pivoting through the home currency when no direct
    /// or inverse rate exists.
    async fn resolve(&self, from: Currency, to: Currency) -> Option<f64> {
        if let Some(rate) = self.direct_rate(from, to).await {
            return Some(rate);
        }

        if from != Currency::HOME && to != Currency::HOME {
            let to_home = self.direct_rate(from, Currency::HOME).await?;
            let from_home = self.direct_rate(Currency::HOME, to).await?;
            let rate = to_home * from_home;

            self.store(from, to, rate).await;
            return Some(rate);
        }

        None
    }
}

impl fmt::Debug for CachedExchangeRateService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CachedExchangeRateService")
            .field("ttl", &self.ttl)
            .field("has_source", &self.source.is_some())
            .field("reference_pairs", &self.reference.len())
            .finish()
    }
}

#[async_trait]
impl ExchangeRateProvider for CachedExchangeRateService {
    async fn get_rate(&self, from: Currency, to: Currency) -> f64 {
        if from == to {
            return 1.0;
        }

        if let Some(rate) = self.resolve(from, to).await {
            return rate;
        }

        // The default is deliberately not cached so that strict lookups
        // keep reporting the pair as unavailable.
        tracing::warn!(%from, %to, "No rate available, falling back to default 1.0");
        record_rate_lookup(from, to, RateLookupSource::Default);
        DEFAULT_RATE
    }

    async fn try_get_rate(&self, from: Currency, to: Currency) -> Option<f64> {
        if from == to {
            return Some(1.0);
        }

        self.resolve(from, to).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::super::source::MockRateSource;
    use super::*;
    use crate::domain::DomainError;
    use crate::infrastructure::clock::manual::ManualClock;

    fn service() -> CachedExchangeRateService {
        CachedExchangeRateService::new(Arc::new(ManualClock::starting_at(epoch())), Duration::hours(1))
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    #[tokio::test]
    async fn test_same_currency_rate_is_one() {
        let service = service();

        assert_eq!(service.get_rate(Currency::Usd, Currency::Usd).await, 1.0);
        assert_eq!(
            service.try_get_rate(Currency::Twd, Currency::Twd).await,
            Some(1.0)
        );
    }

    #[tokio::test]
    async fn test_reference_rate_direct() {
        let service = service();

        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 31.5);
    }

    #[tokio::test]
    async fn test_reference_rate_inverse() {
        let service = service();

        let rate = service.get_rate(Currency::Twd, Currency::Usd).await;

        assert_eq!(rate, 1.0 / 31.5);
    }

    #[tokio::test]
    async fn test_cross_rate_pivots_through_home_currency() {
        let service = service();

        let rate = service.get_rate(Currency::Eur, Currency::Jpy).await;

        assert_eq!(rate, 34.2 * (1.0 / 0.22));
    }

    #[tokio::test]
    async fn test_round_trip_is_close_to_identity() {
        let service = service();

        let out = service.get_rate(Currency::Usd, Currency::Twd).await;
        let back = service.get_rate(Currency::Twd, Currency::Usd).await;

        assert!((out * back - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_upstream_rate_cached_until_ttl_expires() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut source = MockRateSource::new();
        let counter = Arc::clone(&calls);
        source.expect_fetch_rate().returning(move |_, _| {
            let call = counter.fetch_add(1, Ordering::SeqCst);
            Ok(if call == 0 { 30.0 } else { 32.0 })
        });

        let service = CachedExchangeRateService::new(Arc::clone(&clock) as Arc<dyn Clock>, Duration::hours(1))
            .with_source(Arc::new(source));

        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 30.0);

        clock.advance(Duration::minutes(30));
        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 30.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        clock.advance(Duration::minutes(31));
        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 32.0);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_stale_cache_preferred_over_reference_on_upstream_failure() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut source = MockRateSource::new();
        let counter = Arc::clone(&calls);
        source.expect_fetch_rate().returning(move |_, _| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(30.0)
            } else {
                Err(DomainError::provider("upstream unavailable"))
            }
        });

        let service = CachedExchangeRateService::new(Arc::clone(&clock) as Arc<dyn Clock>, Duration::hours(1))
            .with_source(Arc::new(source));

        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 30.0);

        clock.advance(Duration::hours(2));
        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 30.0);
    }

    #[tokio::test]
    async fn test_unknown_pair_degrades_to_default() {
        let service = service().with_reference_rates(HashMap::new());

        assert_eq!(service.get_rate(Currency::Usd, Currency::Twd).await, 1.0);
        assert!(service
            .try_get_rate(Currency::Usd, Currency::Twd)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_degraded_default_is_not_cached() {
        let service = service().with_reference_rates(HashMap::new());

        assert_eq!(service.get_rate(Currency::Eur, Currency::Jpy).await, 1.0);

        // A later strict lookup must still see the pair as unresolved.
        assert!(service
            .try_get_rate(Currency::Eur, Currency::Jpy)
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_convert_rounds_to_cents() {
        let service = service();

        let converted = service.convert(20.99, Currency::Usd, Currency::Twd).await;

        assert!((converted - 661.19).abs() < 0.011);
    }

    #[tokio::test]
    async fn test_convert_same_currency_returns_amount_unchanged() {
        let service = service();

        let converted = service.convert(299.999, Currency::Twd, Currency::Twd).await;

        assert_eq!(converted, 299.999);
    }

    #[tokio::test]
    async fn test_rates_against_base_covers_other_currencies() {
        let service = service();

        let rates = service.rates_against(Currency::Twd).await;

        assert_eq!(rates.len(), Currency::ALL.len() - 1);
        assert!((rates[&Currency::Usd] - 1.0 / 31.5).abs() < 1e-9);
        assert!(!rates.contains_key(&Currency::Twd));
    }
}
