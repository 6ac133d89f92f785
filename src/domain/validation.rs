//! Shared validation reporting
//!
//! Validation entry points accumulate every violation for an input instead
//! of failing on the first one, so callers can report all problems at once.

use crate::domain::error::DomainError;

/// Collected validation failures for one input
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    errors: Vec<String>,
}

impl ValidationReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a violation message
    pub fn push(&mut self, message: impl Into<String>) {
        self.errors.push(message.into());
    }

    /// Record the failure of a single-field check, if any
    pub fn record<E: std::fmt::Display>(&mut self, check: Result<(), E>) {
        if let Err(e) = check {
            self.errors.push(e.to_string());
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<String> {
        self.errors
    }

    /// Convert into a domain error carrying every message, or `Ok` when
    /// nothing was recorded
    pub fn into_result(self) -> Result<(), DomainError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(DomainError::validation(self.errors.join("; ")))
        }
    }
}
