//! Budget management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireUser;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Json};
use crate::domain::{
    Budget, BudgetPatch, BudgetUsage, CategoryBudgetUsage, SavingsPotential,
};
use crate::infrastructure::budget::BudgetUsageReport;

/// Create budget request
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBudgetApiRequest {
    pub monthly_limit: f64,
}

/// Update budget request; absent fields are left untouched
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateBudgetApiRequest {
    pub monthly_limit: Option<f64>,
}

/// Budget response
#[derive(Debug, Clone, Serialize)]
pub struct BudgetResponse {
    pub id: String,
    pub user_id: String,
    pub monthly_limit: f64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Budget> for BudgetResponse {
    fn from(budget: &Budget) -> Self {
        Self {
            id: budget.id().to_string(),
            user_id: budget.user_id().to_string(),
            monthly_limit: budget.monthly_limit(),
            created_at: budget.created_at().to_rfc3339(),
            updated_at: budget.updated_at().to_rfc3339(),
        }
    }
}

/// Usage report response; `budget` is null when the user has none
#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsageResponse {
    pub budget: Option<BudgetResponse>,
    pub usage: BudgetUsage,
    pub category_usage: CategoryBudgetUsage,
    pub recommendations: Vec<String>,
    pub savings_potential: SavingsPotential,
}

impl From<BudgetUsageReport> for BudgetUsageResponse {
    fn from(report: BudgetUsageReport) -> Self {
        Self {
            budget: report.budget.as_ref().map(BudgetResponse::from),
            usage: report.usage,
            category_usage: report.category_usage,
            recommendations: report.recommendations,
            savings_potential: report.savings_potential,
        }
    }
}

/// GET /api/v1/budgets
pub async fn get_budget(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<Option<BudgetResponse>>, ApiError> {
    debug!(user_id = %user.id(), "Getting budget");

    let budget = state
        .budget_service
        .get(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(budget.as_ref().map(BudgetResponse::from)))
}

/// POST /api/v1/budgets
pub async fn create_budget(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Json(request): Json<CreateBudgetApiRequest>,
) -> Result<(StatusCode, Json<BudgetResponse>), ApiError> {
    debug!(
        user_id = %user.id(),
        monthly_limit = request.monthly_limit,
        "Creating budget"
    );

    let budget = state
        .budget_service
        .create(user.id(), request.monthly_limit)
        .await
        .map_err(ApiError::from)?;

    Ok((StatusCode::CREATED, Json(BudgetResponse::from(&budget))))
}

/// PUT /api/v1/budgets/{id}
pub async fn update_budget(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    Json(request): Json<UpdateBudgetApiRequest>,
) -> Result<Json<BudgetResponse>, ApiError> {
    debug!(user_id = %user.id(), budget_id = %id, "Updating budget");

    let patch = BudgetPatch {
        monthly_limit: request.monthly_limit,
    };

    let budget = state
        .budget_service
        .update(user.id(), &id, patch)
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BudgetResponse::from(&budget)))
}

/// DELETE /api/v1/budgets
pub async fn delete_budget(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<StatusCode, ApiError> {
    debug!(user_id = %user.id(), "Deleting budget");

    state
        .budget_service
        .delete(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/budgets/usage
pub async fn get_usage(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<BudgetUsageResponse>, ApiError> {
    debug!(user_id = %user.id(), "Computing budget usage");

    let report = state
        .budget_service
        .usage(user.id())
        .await
        .map_err(ApiError::from)?;

    Ok(Json(BudgetUsageResponse::from(report)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        budget_usage, category_budget_usage, recommendations, savings_potential, BudgetId, UserId,
    };

    fn test_budget() -> Budget {
        Budget::new(
            BudgetId::new("budget-1"),
            UserId::new("user-1").unwrap(),
            2000.0,
        )
    }

    #[test]
    fn test_budget_response_fields() {
        let budget = test_budget();
        let response = BudgetResponse::from(&budget);

        assert_eq!(response.id, "budget-1");
        assert_eq!(response.user_id, "user-1");
        assert_eq!(response.monthly_limit, 2000.0);
    }

    #[test]
    fn test_usage_response_with_no_budget_serializes_null() {
        let report = BudgetUsageReport {
            budget: None,
            usage: budget_usage(None, &[]),
            category_usage: category_budget_usage(None, &[]),
            recommendations: recommendations(None, &[]),
            savings_potential: savings_potential(&[]),
        };

        let json = serde_json::to_value(BudgetUsageResponse::from(report)).unwrap();
        assert!(json["budget"].is_null());
        assert_eq!(json["usage"]["total_budget"], 0.0);
        assert_eq!(json["usage"]["is_over_budget"], false);
    }

    #[test]
    fn test_update_request_tolerates_missing_limit() {
        let request: UpdateBudgetApiRequest = serde_json::from_str("{}").unwrap();
        assert!(request.monthly_limit.is_none());
    }
}
