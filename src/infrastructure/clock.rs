//! Clock abstraction for cache expiry decisions

use chrono::{DateTime, Utc};
use std::fmt::Debug;

/// Source of the current time.
///
/// Injected into anything that makes expiry decisions so tests can
/// control time instead of sleeping.
pub trait Clock: Send + Sync + Debug {
    /// The current instant
    fn now(&self) -> DateTime<Utc>;
}

/// Clock backed by the real system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
