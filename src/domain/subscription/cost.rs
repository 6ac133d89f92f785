//! Subscription cost calculator
//!
//! Pure functions normalizing subscription prices across billing cycles.
//! All amounts are in the home currency (the entity's `price` snapshot);
//! inactive subscriptions never contribute to aggregate totals.

use std::collections::BTreeMap;

use chrono::{DateTime, Months, Utc};

use super::entity::{BillingCycle, Subscription, SubscriptionCategory};

/// Normalized cost of one subscription per month
pub fn monthly_cost(subscription: &Subscription) -> f64 {
    match subscription.cycle() {
        BillingCycle::Monthly => subscription.price(),
        BillingCycle::Quarterly => subscription.price() / 3.0,
        BillingCycle::Yearly => subscription.price() / 12.0,
    }
}

/// Normalized cost of one subscription per year
pub fn yearly_cost(subscription: &Subscription) -> f64 {
    match subscription.cycle() {
        BillingCycle::Monthly => subscription.price() * 12.0,
        BillingCycle::Quarterly => subscription.price() * 4.0,
        BillingCycle::Yearly => subscription.price(),
    }
}

/// Date of the next charge: the start date advanced by one cycle unit.
///
/// Month arithmetic is calendar-correct; a start on Jan 31 bills next on
/// Feb 28 (or 29), never on a rolled-over March date.
pub fn next_billing_date(subscription: &Subscription) -> DateTime<Utc> {
    let months = match subscription.cycle() {
        BillingCycle::Monthly => Months::new(1),
        BillingCycle::Quarterly => Months::new(3),
        BillingCycle::Yearly => Months::new(12),
    };
    subscription.start_date() + months
}

/// Whether the subscription bills within the next `days_ahead` days
pub fn is_due_soon(subscription: &Subscription, now: DateTime<Utc>, days_ahead: i64) -> bool {
    next_billing_date(subscription) <= now + chrono::Duration::days(days_ahead)
}

/// Sum of monthly costs over active subscriptions
pub fn total_monthly_cost(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.is_active())
        .map(monthly_cost)
        .sum()
}

/// Sum of yearly costs over active subscriptions
pub fn total_yearly_cost(subscriptions: &[Subscription]) -> f64 {
    subscriptions
        .iter()
        .filter(|s| s.is_active())
        .map(yearly_cost)
        .sum()
}

/// Monthly cost per category, active subscriptions only
pub fn category_costs(subscriptions: &[Subscription]) -> BTreeMap<SubscriptionCategory, f64> {
    let mut costs = BTreeMap::new();

    for subscription in subscriptions.iter().filter(|s| s.is_active()) {
        *costs.entry(subscription.category()).or_insert(0.0) += monthly_cost(subscription);
    }

    costs
}
