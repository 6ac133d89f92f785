//! Budget entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::user::UserId;

/// Budget identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BudgetId(String);

impl BudgetId {
    /// Create a new budget ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh random ID
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for BudgetId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BudgetId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for BudgetId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user's monthly spending ceiling, in the home currency.
///
/// Each user has at most one budget; creation is rejected when one
/// already exists for the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Budget {
    id: BudgetId,
    user_id: UserId,
    monthly_limit: f64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Budget {
    /// Create a new budget
    pub fn new(id: BudgetId, user_id: UserId, monthly_limit: f64) -> Self {
        let now = Utc::now();
        Self {
            id,
            user_id,
            monthly_limit,
            created_at: now,
            updated_at: now,
        }
    }

    /// Reconstruct a budget from stored parts, preserving timestamps
    pub fn from_parts(
        id: BudgetId,
        user_id: UserId,
        monthly_limit: f64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            monthly_limit,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> &BudgetId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn monthly_limit(&self) -> f64 {
        self.monthly_limit
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Set the monthly spending limit
    pub fn set_monthly_limit(&mut self, monthly_limit: f64) {
        self.monthly_limit = monthly_limit;
        self.touch();
    }

    /// Apply a partial update, touching the entity only if a field is present
    pub fn apply(&mut self, patch: &BudgetPatch) {
        if let Some(monthly_limit) = patch.monthly_limit {
            self.monthly_limit = monthly_limit;
            self.touch();
        }
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update for a budget; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BudgetPatch {
    pub monthly_limit: Option<f64>,
}

impl BudgetPatch {
    /// Whether the patch carries no changes at all
    pub fn is_empty(&self) -> bool {
        self.monthly_limit.is_none()
    }
}
