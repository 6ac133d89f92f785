//! Sliding-window request rate limiting
//!
//! Requests are counted per key (authenticated user id, falling back to the
//! client IP) inside a rolling 60 second window, with a separate budget per
//! route class. State is in-process; limits reset on restart.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;
use tokio::sync::RwLock;

use crate::infrastructure::clock::Clock;

const WINDOW: Duration = Duration::seconds(60);

/// Route class determining which request budget applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitClass {
    /// Login, registration, password changes
    Auth,
    /// Resource creation
    Create,
    /// List and detail reads
    Read,
    /// Everything else
    General,
}

impl RateLimitClass {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Auth => "auth",
            Self::Create => "create",
            Self::Read => "read",
            Self::General => "general",
        }
    }
}

/// Per-minute request budgets for each route class
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub enabled: bool,
    pub auth_per_minute: usize,
    pub create_per_minute: usize,
    pub read_per_minute: usize,
    pub general_per_minute: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            auth_per_minute: 5,
            create_per_minute: 20,
            read_per_minute: 200,
            general_per_minute: 100,
        }
    }
}

/// Outcome of a rate limit check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RateLimitDecision {
    Allowed,
    Limited { retry_after_secs: u64 },
}

impl RateLimitDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// In-memory sliding-window rate limiter
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clock: Arc<dyn Clock>,
    windows: RwLock<HashMap<String, Vec<DateTime<Utc>>>>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            windows: RwLock::new(HashMap::new()),
        }
    }

    fn limit_for(&self, class: RateLimitClass) -> usize {
        match class {
            RateLimitClass::Auth => self.config.auth_per_minute,
            RateLimitClass::Create => self.config.create_per_minute,
            RateLimitClass::Read => self.config.read_per_minute,
            RateLimitClass::General => self.config.general_per_minute,
        }
    }

    /// Check whether a request may proceed, recording it if so
    pub async fn check(&self, class: RateLimitClass, key: &str) -> RateLimitDecision {
        if !self.config.enabled {
            return RateLimitDecision::Allowed;
        }

        let limit = self.limit_for(class);
        let now = self.clock.now();
        let cutoff = now - WINDOW;

        let entry_key = format!("{}:{}", class.as_str(), key);

        let mut windows = self.windows.write().await;
        let entry = windows.entry(entry_key).or_default();

        entry.retain(|ts| *ts > cutoff);

        if entry.len() >= limit {
            // Entries are pushed in time order, so the first is the oldest
            let oldest = entry[0];
            let until_free = (oldest + WINDOW - now).num_milliseconds().max(0) as u64;
            let retry_after_secs = (until_free.div_ceil(1000)).max(1);

            return RateLimitDecision::Limited { retry_after_secs };
        }

        entry.push(now);

        RateLimitDecision::Allowed
    }

    /// Drop keys whose entire window has expired. Returns the number of
    /// keys removed.
    pub async fn cleanup(&self) -> usize {
        let cutoff = self.clock.now() - WINDOW;

        let mut windows = self.windows.write().await;
        let before = windows.len();

        windows.retain(|_, entries| entries.iter().any(|ts| *ts > cutoff));

        before - windows.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::clock::manual::ManualClock;

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn limiter_with(clock: Arc<ManualClock>) -> RateLimiter {
        RateLimiter::new(RateLimitConfig::default(), clock)
    }

    #[tokio::test]
    async fn test_allows_up_to_limit_then_blocks() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        for _ in 0..5 {
            assert!(limiter
                .check(RateLimitClass::Auth, "ip:10.0.0.1")
                .await
                .is_allowed());
        }

        let decision = limiter.check(RateLimitClass::Auth, "ip:10.0.0.1").await;
        assert!(matches!(
            decision,
            RateLimitDecision::Limited { retry_after_secs } if retry_after_secs >= 1 && retry_after_secs <= 60
        ));
    }

    #[tokio::test]
    async fn test_window_slides() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        for _ in 0..5 {
            limiter.check(RateLimitClass::Auth, "ip:10.0.0.1").await;
        }
        assert!(!limiter
            .check(RateLimitClass::Auth, "ip:10.0.0.1")
            .await
            .is_allowed());

        clock.advance(Duration::seconds(61));

        assert!(limiter
            .check(RateLimitClass::Auth, "ip:10.0.0.1")
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_keys_are_independent() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        for _ in 0..5 {
            limiter.check(RateLimitClass::Auth, "ip:10.0.0.1").await;
        }

        assert!(!limiter
            .check(RateLimitClass::Auth, "ip:10.0.0.1")
            .await
            .is_allowed());
        assert!(limiter
            .check(RateLimitClass::Auth, "ip:10.0.0.2")
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_classes_have_separate_budgets() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        for _ in 0..5 {
            limiter.check(RateLimitClass::Auth, "user:alice").await;
        }

        assert!(!limiter
            .check(RateLimitClass::Auth, "user:alice")
            .await
            .is_allowed());
        // The same key still has its read budget
        assert!(limiter
            .check(RateLimitClass::Read, "user:alice")
            .await
            .is_allowed());
    }

    #[tokio::test]
    async fn test_disabled_limiter_always_allows() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let config = RateLimitConfig {
            enabled: false,
            ..Default::default()
        };
        let limiter = RateLimiter::new(config, clock);

        for _ in 0..100 {
            assert!(limiter
                .check(RateLimitClass::Auth, "ip:10.0.0.1")
                .await
                .is_allowed());
        }
    }

    #[tokio::test]
    async fn test_retry_after_shrinks_as_window_moves() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        for _ in 0..5 {
            limiter.check(RateLimitClass::Auth, "ip:10.0.0.1").await;
        }

        clock.advance(Duration::seconds(50));

        let decision = limiter.check(RateLimitClass::Auth, "ip:10.0.0.1").await;
        match decision {
            RateLimitDecision::Limited { retry_after_secs } => {
                assert!(retry_after_secs <= 10);
            }
            RateLimitDecision::Allowed => panic!("expected the request to be limited"),
        }
    }

    #[tokio::test]
    async fn test_cleanup_drops_stale_keys() {
        let clock = Arc::new(ManualClock::starting_at(epoch()));
        let limiter = limiter_with(Arc::clone(&clock));

        limiter.check(RateLimitClass::Read, "ip:10.0.0.1").await;
        limiter.check(RateLimitClass::Read, "ip:10.0.0.2").await;

        clock.advance(Duration::seconds(30));
        limiter.check(RateLimitClass::Read, "ip:10.0.0.2").await;

        clock.advance(Duration::seconds(45));

        // 10.0.0.1 is fully stale; 10.0.0.2 still has one fresh entry
        let removed = limiter.cleanup().await;
        assert_eq!(removed, 1);
    }
}
