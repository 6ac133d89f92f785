//! Subscription entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::currency::Currency;
use crate::domain::user::UserId;

/// Subscription identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(String);

impl SubscriptionId {
    /// Create a new subscription ID
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

impl From<String> for SubscriptionId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SubscriptionId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How often a subscription bills
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingCycle {
    Monthly,
    Quarterly,
    Yearly,
}

impl BillingCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Yearly => "yearly",
        }
    }
}

impl std::fmt::Display for BillingCycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classification tag for a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionCategory {
    Streaming,
    Software,
    News,
    Gaming,
    Music,
    Education,
    Productivity,
    Other,
}

impl SubscriptionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Streaming => "streaming",
            Self::Software => "software",
            Self::News => "news",
            Self::Gaming => "gaming",
            Self::Music => "music",
            Self::Education => "education",
            Self::Productivity => "productivity",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for SubscriptionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A recurring subscription owned by a user
///
/// `price` is the original price converted into the home currency at the
/// rate effective when the subscription was created or last repriced. It is
/// a cached snapshot, so it can drift from the current-rate value as rates
/// move; users see a stable historical price.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    id: SubscriptionId,
    /// Owning user
    user_id: UserId,
    /// Display name of the service
    name: String,
    /// Amount as entered by the user, in `currency`
    original_price: f64,
    /// Currency the original price is denominated in
    currency: Currency,
    /// Home-currency price snapshot
    price: f64,
    /// Billing periodicity
    cycle: BillingCycle,
    /// Classification tag
    category: SubscriptionCategory,
    /// Date the subscription began
    start_date: DateTime<Utc>,
    /// Soft pause/delete flag
    is_active: bool,
    /// Creation timestamp
    created_at: DateTime<Utc>,
    /// Last update timestamp
    updated_at: DateTime<Utc>,
}

impl Subscription {
    /// Create a new active subscription
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: SubscriptionId,
        user_id: UserId,
        name: impl Into<String>,
        original_price: f64,
        currency: Currency,
        price: f64,
        cycle: BillingCycle,
        category: SubscriptionCategory,
        start_date: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();

        Self {
            id,
            user_id,
            name: name.into(),
            original_price,
            currency,
            price,
            cycle,
            category,
            start_date,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    /// Rebuild a subscription from stored fields, preserving timestamps
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: SubscriptionId,
        user_id: UserId,
        name: String,
        original_price: f64,
        currency: Currency,
        price: f64,
        cycle: BillingCycle,
        category: SubscriptionCategory,
        start_date: DateTime<Utc>,
        is_active: bool,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            user_id,
            name,
            original_price,
            currency,
            price,
            cycle,
            category,
            start_date,
            is_active,
            created_at,
            updated_at,
        }
    }

    // Getters

    pub fn id(&self) -> &SubscriptionId {
        &self.id
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn original_price(&self) -> f64 {
        self.original_price
    }

    pub fn currency(&self) -> Currency {
        self.currency
    }

    pub fn price(&self) -> f64 {
        self.price
    }

    pub fn cycle(&self) -> BillingCycle {
        self.cycle
    }

    pub fn category(&self) -> SubscriptionCategory {
        self.category
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    // Mutators

    /// Replace the home-currency price snapshot
    pub fn set_price(&mut self, price: f64) {
        self.price = price;
        self.touch();
    }

    /// Pause the subscription (soft delete)
    pub fn deactivate(&mut self) {
        self.is_active = false;
        self.touch();
    }

    /// Resume a paused subscription
    pub fn activate(&mut self) {
        self.is_active = true;
        self.touch();
    }

    /// Apply the present fields of a patch. The home-currency price is not
    /// recomputed here; callers reprice via [`Self::set_price`] when the
    /// patch changes the amount or currency.
    pub fn apply(&mut self, patch: &SubscriptionPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(original_price) = patch.original_price {
            self.original_price = original_price;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(cycle) = patch.cycle {
            self.cycle = cycle;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
        if let Some(start_date) = patch.start_date {
            self.start_date = start_date;
        }
        if let Some(is_active) = patch.is_active {
            self.is_active = is_active;
        }
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}

/// Partial update for a subscription; only present fields are applied
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubscriptionPatch {
    pub name: Option<String>,
    pub original_price: Option<f64>,
    pub currency: Option<Currency>,
    pub cycle: Option<BillingCycle>,
    pub category: Option<SubscriptionCategory>,
    pub start_date: Option<DateTime<Utc>>,
    pub is_active: Option<bool>,
}

impl SubscriptionPatch {
    /// Whether the patch changes nothing
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.original_price.is_none()
            && self.currency.is_none()
            && self.cycle.is_none()
            && self.category.is_none()
            && self.start_date.is_none()
            && self.is_active.is_none()
    }

    /// Whether applying the patch requires recomputing the home-currency
    /// price snapshot
    pub fn affects_price(&self) -> bool {
        self.original_price.is_some() || self.currency.is_some()
    }
}
