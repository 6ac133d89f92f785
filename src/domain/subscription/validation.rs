//! Subscription validation utilities

use thiserror::Error;

use crate::domain::validation::ValidationReport;

/// Errors that can occur during subscription validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SubscriptionValidationError {
    #[error("Subscription name cannot be empty")]
    EmptyName,

    #[error("Subscription name exceeds maximum length of {0} characters")]
    NameTooLong(usize),

    #[error("Price must be greater than 0")]
    NonPositivePrice,
}

pub const MAX_NAME_LENGTH: usize = 100;

/// Validate a subscription display name
///
/// Rules:
/// - Cannot be empty or whitespace-only
/// - Maximum 100 characters
pub fn validate_name(name: &str) -> Result<(), SubscriptionValidationError> {
    if name.trim().is_empty() {
        return Err(SubscriptionValidationError::EmptyName);
    }

    if name.chars().count() > MAX_NAME_LENGTH {
        return Err(SubscriptionValidationError::NameTooLong(MAX_NAME_LENGTH));
    }

    Ok(())
}

/// Validate an entered price
pub fn validate_price(price: f64) -> Result<(), SubscriptionValidationError> {
    if !price.is_finite() || price <= 0.0 {
        return Err(SubscriptionValidationError::NonPositivePrice);
    }

    Ok(())
}

/// Run every field check, collecting all violations.
///
/// Currency membership is enforced by the `Currency` type at the request
/// boundary; the currency-reachability probe needs the rate provider and
/// happens in the subscription service on top of this report.
pub fn validate_subscription_fields(name: &str, price: f64) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.record(validate_name(name));
    report.record(validate_price(price));
    report
}
