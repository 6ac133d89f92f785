//! PostgreSQL budget repository

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::budget::{Budget, BudgetId, BudgetRepository};
use crate::domain::user::UserId;
use crate::domain::DomainError;

/// PostgreSQL implementation of BudgetRepository
#[derive(Debug, Clone)]
pub struct PostgresBudgetRepository {
    pool: PgPool,
}

impl PostgresBudgetRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BudgetRepository for PostgresBudgetRepository {
    async fn get(&self, id: &BudgetId) -> Result<Option<Budget>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, monthly_limit, created_at, updated_at
            FROM budgets
            WHERE id = $1
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get budget: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    async fn get_by_user(&self, user_id: &UserId) -> Result<Option<Budget>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, monthly_limit, created_at, updated_at
            FROM budgets
            WHERE user_id = $1
            "#,
        )
        .bind(user_id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to get budget by user: {}", e)))?;

        match row {
            Some(row) => Ok(Some(row_to_budget(&row)?)),
            None => Ok(None),
        }
    }

    async fn create(&self, budget: Budget) -> Result<Budget, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO budgets (id, user_id, monthly_limit, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(budget.id().as_str())
        .bind(budget.user_id().as_str())
        .bind(budget.monthly_limit())
        .bind(budget.created_at())
        .bind(budget.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let msg = e.to_string();

            if msg.contains("duplicate key") || msg.contains("unique constraint") {
                if msg.contains("user_id") {
                    DomainError::conflict(format!(
                        "User '{}' already has a budget",
                        budget.user_id().as_str()
                    ))
                } else {
                    DomainError::conflict(format!(
                        "Budget with ID '{}' already exists",
                        budget.id().as_str()
                    ))
                }
            } else {
                DomainError::storage(format!("Failed to create budget: {}", e))
            }
        })?;

        Ok(budget)
    }

    async fn update(&self, budget: &Budget) -> Result<Budget, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE budgets
            SET monthly_limit = $2, updated_at = $3
            WHERE id = $1
            "#,
        )
        .bind(budget.id().as_str())
        .bind(budget.monthly_limit())
        .bind(budget.updated_at())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to update budget: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(DomainError::not_found(format!(
                "Budget '{}' not found",
                budget.id().as_str()
            )));
        }

        Ok(budget.clone())
    }

    async fn delete(&self, id: &BudgetId) -> Result<bool, DomainError> {
        let result = sqlx::query("DELETE FROM budgets WHERE id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to delete budget: {}", e)))?;

        Ok(result.rows_affected() > 0)
    }
}

fn row_to_budget(row: &sqlx::postgres::PgRow) -> Result<Budget, DomainError> {
    let id: String = row.get("id");
    let user_id: String = row.get("user_id");
    let monthly_limit: f64 = row.get("monthly_limit");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
    let updated_at: chrono::DateTime<chrono::Utc> = row.get("updated_at");

    let user_id = UserId::new(&user_id)
        .map_err(|e| DomainError::storage(format!("Invalid user ID in database: {}", e)))?;

    Ok(Budget::from_parts(
        BudgetId::new(id),
        user_id,
        monthly_limit,
        created_at,
        updated_at,
    ))
}
