//! API middleware components

pub mod logging;
pub mod metrics;
pub mod rate_limit;
pub mod security;
pub mod user_auth;

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use rate_limit::rate_limit_middleware;
pub use security::{security_headers_middleware, MAX_BODY_SIZE};
pub use user_auth::RequireUser;
