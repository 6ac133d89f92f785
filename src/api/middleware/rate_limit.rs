//! Request rate limiting middleware
//!
//! Requests are keyed by the authenticated user when a valid token is
//! present, otherwise by client IP. Authentication routes are always keyed
//! by IP so that failed login attempts cannot be spread across accounts.

use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Method, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;
use crate::api::types::ApiError;
use crate::infrastructure::rate_limit::{RateLimitClass, RateLimitDecision};

use super::user_auth::try_jwt_auth;

/// Middleware enforcing per-class request budgets
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let path = request.uri().path().to_string();

    // Health and metrics endpoints are never limited
    if !path.starts_with("/api") {
        return next.run(request).await;
    }

    let class = classify(request.method(), &path);

    let key = match class {
        RateLimitClass::Auth => format!("ip:{}", client_ip(&request)),
        _ => match try_jwt_auth(request.headers(), &state).await {
            Some(user) => format!("user:{}", user.id()),
            None => format!("ip:{}", client_ip(&request)),
        },
    };

    match state.rate_limiter.check(class, &key).await {
        RateLimitDecision::Allowed => next.run(request).await,
        RateLimitDecision::Limited { retry_after_secs } => {
            tracing::warn!(%key, ?class, retry_after_secs, "Rate limit exceeded");

            ApiError::rate_limited("Too many requests; please slow down", retry_after_secs)
                .into_response()
        }
    }
}

/// Map a request to its rate limit class
fn classify(method: &Method, path: &str) -> RateLimitClass {
    if path.starts_with("/api/auth") && *method != Method::GET {
        return RateLimitClass::Auth;
    }

    match *method {
        Method::GET => RateLimitClass::Read,
        Method::POST => RateLimitClass::Create,
        _ => RateLimitClass::General,
    }
}

/// Best-effort client address: proxy headers first, then the socket peer
fn client_ip(request: &Request<Body>) -> String {
    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    if let Some(real_ip) = request
        .headers()
        .get("x-real-ip")
        .and_then(|v| v.to_str().ok())
    {
        return real_ip.trim().to_string();
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}
