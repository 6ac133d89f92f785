//! Infrastructure layer - External service implementations

pub mod auth;
pub mod budget;
pub mod clock;
pub mod exchange_rate;
pub mod logging;
pub mod observability;
pub mod rate_limit;
pub mod storage;
pub mod subscription;
pub mod user;
