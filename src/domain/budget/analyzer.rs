//! Budget usage analysis
//!
//! Pure functions over a budget and a set of subscriptions: aggregate
//! usage, per-category breakdown, spending recommendations, and the
//! hypothetical savings of switching everything to annual plans. All
//! results are in the home currency.

use std::collections::BTreeMap;

use serde::Serialize;

use super::entity::Budget;
use crate::domain::currency::round2;
use crate::domain::subscription::{
    category_costs, monthly_cost, total_monthly_cost, yearly_cost, Subscription,
    SubscriptionCategory,
};

/// Annual-plan price as a share of the month-to-month price. Annual
/// billing is assumed to come with a 10% discount.
const ANNUAL_PLAN_DISCOUNT: f64 = 0.9;

/// Aggregate budget usage for one user
#[derive(Debug, Clone, Serialize)]
pub struct BudgetUsage {
    /// The configured monthly limit, 0 when no budget is set
    pub total_budget: f64,
    /// Total monthly cost of the active subscriptions
    pub used_amount: f64,
    /// Limit minus usage; negative when over budget
    pub remaining_amount: f64,
    /// Usage as a percentage of the limit, rounded to 2 decimals
    pub usage_percentage: f64,
    /// Whether usage exceeds the limit
    pub is_over_budget: bool,
    /// How far usage exceeds the limit, 0 when within budget
    pub over_budget_amount: f64,
}

/// Usage of a single category against the budget
#[derive(Debug, Clone, Serialize)]
pub struct CategoryUsage {
    /// Monthly cost of the category
    pub cost: f64,
    /// Share of the total monthly spend, rounded to 2 decimals
    pub percentage_of_total: f64,
    /// Share of the budget limit, rounded to 2 decimals
    pub percentage_of_budget: f64,
}

/// Per-category budget usage breakdown
#[derive(Debug, Clone, Serialize)]
pub struct CategoryBudgetUsage {
    /// The configured monthly limit, 0 when no budget is set
    pub total_budget: f64,
    /// Total monthly cost across all categories
    pub total_used: f64,
    /// Usage per category, only categories with active subscriptions
    pub categories: BTreeMap<SubscriptionCategory, CategoryUsage>,
}

/// Hypothetical savings of moving every subscription to an annual plan
#[derive(Debug, Clone, Serialize)]
pub struct SavingsPotential {
    /// What a year costs at the current monthly rates
    pub current_yearly_cost: f64,
    /// What a year would cost on discounted annual plans
    pub potential_yearly_cost: f64,
    /// Annual savings, clamped to 0
    pub potential_annual_savings: f64,
    /// Savings as a percentage of the current yearly cost
    pub savings_percentage: f64,
}

/// Compute aggregate budget usage.
///
/// Without a budget every field is zero and `is_over_budget` is false.
/// The percentage is guarded against a zero limit.
pub fn budget_usage(budget: Option<&Budget>, subscriptions: &[Subscription]) -> BudgetUsage {
    let budget = match budget {
        Some(budget) => budget,
        None => {
            return BudgetUsage {
                total_budget: 0.0,
                used_amount: 0.0,
                remaining_amount: 0.0,
                usage_percentage: 0.0,
                is_over_budget: false,
                over_budget_amount: 0.0,
            };
        }
    };

    let limit = budget.monthly_limit();
    let used = total_monthly_cost(subscriptions);

    let usage_percentage = if limit > 0.0 {
        round2(used / limit * 100.0)
    } else {
        0.0
    };

    BudgetUsage {
        total_budget: limit,
        used_amount: used,
        remaining_amount: limit - used,
        usage_percentage,
        is_over_budget: used > limit,
        over_budget_amount: (used - limit).max(0.0),
    }
}

/// Break monthly spend down per category, as a share of both the total
/// spend and the budget limit.
pub fn category_budget_usage(
    budget: Option<&Budget>,
    subscriptions: &[Subscription],
) -> CategoryBudgetUsage {
    let costs = category_costs(subscriptions);
    let total_used: f64 = costs.values().sum();
    let limit = budget.map(|b| b.monthly_limit()).unwrap_or(0.0);

    let categories = costs
        .into_iter()
        .map(|(category, cost)| {
            let percentage_of_total = if total_used > 0.0 {
                round2(cost / total_used * 100.0)
            } else {
                0.0
            };
            let percentage_of_budget = if limit > 0.0 {
                round2(cost / limit * 100.0)
            } else {
                0.0
            };

            (
                category,
                CategoryUsage {
                    cost,
                    percentage_of_total,
                    percentage_of_budget,
                },
            )
        })
        .collect();

    CategoryBudgetUsage {
        total_budget: limit,
        total_used,
        categories,
    }
}

/// Produce spending recommendations, most urgent first.
///
/// Without a budget the single recommendation is to set one. Otherwise:
/// an over-budget warning with the exact overage, then a 90% or 80%
/// usage warning (the 90% one wins when both apply), then one warning
/// per category that takes more than half of the budget.
pub fn recommendations(budget: Option<&Budget>, subscriptions: &[Subscription]) -> Vec<String> {
    let mut recommendations = Vec::new();

    let budget = match budget {
        Some(budget) => budget,
        None => {
            recommendations.push(
                "Set a monthly budget limit to better manage subscription spending".to_string(),
            );
            return recommendations;
        }
    };

    let usage = budget_usage(Some(budget), subscriptions);

    if usage.is_over_budget {
        recommendations.push(format!(
            "Current spending exceeds the budget by {:.2}; review and cancel unnecessary subscriptions",
            usage.over_budget_amount
        ));
    }

    if usage.usage_percentage > 90.0 {
        recommendations.push("Budget usage is above 90%, close to the monthly limit".to_string());
    } else if usage.usage_percentage > 80.0 {
        recommendations.push("Budget usage is above 80%; keep an eye on spending".to_string());
    }

    let category_usage = category_budget_usage(Some(budget), subscriptions);
    for (category, info) in &category_usage.categories {
        if info.percentage_of_budget > 50.0 {
            recommendations.push(format!(
                "The {} category takes {:.1}% of the budget; check for duplicate or unnecessary subscriptions",
                category, info.percentage_of_budget
            ));
        }
    }

    recommendations
}

/// Estimate what switching every active subscription to an annual plan
/// would save over a year, assuming the usual annual discount.
pub fn savings_potential(subscriptions: &[Subscription]) -> SavingsPotential {
    let mut current_yearly = 0.0;
    let mut annual_plan_yearly = 0.0;

    for subscription in subscriptions.iter().filter(|s| s.is_active()) {
        current_yearly += monthly_cost(subscription) * 12.0;
        annual_plan_yearly += yearly_cost(subscription);
    }

    let potential_yearly = annual_plan_yearly * ANNUAL_PLAN_DISCOUNT;
    let savings = current_yearly - potential_yearly;

    SavingsPotential {
        current_yearly_cost: current_yearly,
        potential_yearly_cost: potential_yearly,
        potential_annual_savings: savings.max(0.0),
        savings_percentage: if current_yearly > 0.0 {
            savings / current_yearly * 100.0
        } else {
            0.0
        },
    }
}
