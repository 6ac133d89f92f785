//! Budget field validation

use thiserror::Error;

use crate::domain::validation::ValidationReport;

/// Budget validation errors
#[derive(Debug, Error, PartialEq)]
pub enum BudgetValidationError {
    #[error("Monthly limit must be greater than 0")]
    NonPositiveLimit,

    #[error("Monthly limit cannot exceed 1,000,000")]
    LimitTooHigh,
}

/// Highest allowed monthly limit, in the home currency (inclusive)
pub const MAX_MONTHLY_LIMIT: f64 = 1_000_000.0;

/// Validate a monthly budget limit
pub fn validate_monthly_limit(monthly_limit: f64) -> Result<(), BudgetValidationError> {
    if !monthly_limit.is_finite() || monthly_limit <= 0.0 {
        return Err(BudgetValidationError::NonPositiveLimit);
    }

    if monthly_limit > MAX_MONTHLY_LIMIT {
        return Err(BudgetValidationError::LimitTooHigh);
    }

    Ok(())
}

/// Validate budget fields, collecting every violation instead of
/// stopping at the first.
pub fn validate_budget_data(monthly_limit: f64) -> ValidationReport {
    let mut report = ValidationReport::new();
    report.record(validate_monthly_limit(monthly_limit));
    report
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_limit() {
        assert!(validate_monthly_limit(3000.0).is_ok());
    }

    #[test]
    fn test_upper_bound_is_inclusive() {
        assert!(validate_monthly_limit(1_000_000.0).is_ok());
    }

    #[test]
    fn test_zero_limit_rejected() {
        assert_eq!(
            validate_monthly_limit(0.0),
            Err(BudgetValidationError::NonPositiveLimit)
        );
    }

    #[test]
    fn test_negative_limit_rejected() {
        let report = validate_budget_data(-100.0);

        assert!(!report.is_valid());
        assert!(report.errors()[0].contains("must be greater than 0"));
    }

    #[test]
    fn test_excessive_limit_rejected() {
        let report = validate_budget_data(2_000_000.0);

        assert!(!report.is_valid());
        assert!(report.errors()[0].contains("1,000,000"));
    }

    #[test]
    fn test_nan_rejected() {
        assert_eq!(
            validate_monthly_limit(f64::NAN),
            Err(BudgetValidationError::NonPositiveLimit)
        );
    }
}
