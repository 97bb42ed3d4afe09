//! Pricing plan configuration and definitions.
//!
//! Define the subscription plans the application sells, with display
//! metadata, pricing, and the feature list each plan unlocks.
//!
//! Plans are defined in code at startup and are immutable for the process
//! lifetime:
//!
//! ```rust
//! use subtrack_core::billing::{BillingInterval, Plans};
//!
//! let plans = Plans::builder()
//!     .plan("plus_monthly")
//!         .display_name("Subtrack Plus")
//!         .price(499, "usd")
//!         .interval(BillingInterval::Month)
//!         .features(["unlimited_subscriptions", "renewal_alerts"])
//!         .price_ref("price_plus_monthly")
//!         .done()
//!     .plan("plus_annual")
//!         .display_name("Subtrack Plus (Annual)")
//!         .price(3999, "usd")
//!         .interval(BillingInterval::Year)
//!         .features(["unlimited_subscriptions", "renewal_alerts", "spend_reports"])
//!         .price_ref("price_plus_annual")
//!         .done()
//!     .build();
//!
//! assert!(plans.contains("plus_monthly"));
//! ```

use std::collections::HashMap;

use serde::Serialize;

/// A collection of pricing plans, keyed by plan ID.
#[derive(Clone, Debug, Default)]
pub struct Plans {
    plans: HashMap<String, PricingPlan>,
}

impl Plans {
    /// Create a new empty plans collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder for constructing plans.
    #[must_use]
    pub fn builder() -> PlansBuilder {
        PlansBuilder::new()
    }

    /// Add a single plan.
    pub fn add(&mut self, plan: PricingPlan) {
        self.plans.insert(plan.id.clone(), plan);
    }

    /// Get a plan by ID.
    #[must_use]
    pub fn get(&self, plan_id: &str) -> Option<&PricingPlan> {
        self.plans.get(plan_id)
    }

    /// Check if a plan exists.
    #[must_use]
    pub fn contains(&self, plan_id: &str) -> bool {
        self.plans.contains_key(plan_id)
    }

    /// Get all plan IDs.
    #[must_use]
    pub fn plan_ids(&self) -> Vec<&str> {
        self.plans.keys().map(|s| s.as_str()).collect()
    }

    /// Get the number of plans.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plans.len()
    }

    /// Check if there are no plans.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plans.is_empty()
    }

    /// Iterate over all plans.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PricingPlan)> {
        self.plans.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Find a plan by its external price reference.
    #[must_use]
    pub fn find_by_price_ref(&self, price_ref: &str) -> Option<&PricingPlan> {
        self.plans.values().find(|p| p.price_ref == price_ref)
    }

    /// Get all external price references.
    #[must_use]
    pub fn all_price_refs(&self) -> Vec<&str> {
        self.plans.values().map(|p| p.price_ref.as_str()).collect()
    }
}

/// A single pricing plan.
///
/// Immutable once defined; created at configuration load, never mutated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingPlan {
    /// Plan identifier (e.g., "plus_monthly").
    pub id: String,
    /// Display name shown to users.
    pub display_name: String,
    /// Price in minor currency units (e.g., cents).
    pub price: i64,
    /// ISO-4217 currency code, lowercase (e.g., "usd").
    pub currency: String,
    /// Billing interval.
    pub interval: BillingInterval,
    /// Features unlocked by this plan.
    pub features: Vec<String>,
    /// External price reference at the billing provider.
    pub price_ref: String,
}

impl PricingPlan {
    /// Check if this plan unlocks a specific feature.
    #[must_use]
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Get the price formatted for display (e.g., "$4.99").
    #[must_use]
    pub fn formatted_price(&self) -> String {
        let symbol = match self.currency.as_str() {
            "usd" => "$",
            "gbp" => "£",
            "eur" => "€",
            _ => &self.currency,
        };
        let major = self.price as f64 / 100.0;
        format!("{}{:.2}", symbol, major)
    }
}

/// Billing interval for a plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BillingInterval {
    /// Billed monthly.
    Month,
    /// Billed yearly.
    Year,
}

impl BillingInterval {
    /// Parse from the wire representation. Unknown values are rejected, not
    /// defaulted; interval strings come from untrusted payloads.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "month" => Some(Self::Month),
            "year" => Some(Self::Year),
            _ => None,
        }
    }

    /// Convert to the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl std::fmt::Display for BillingInterval {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Builder for constructing a collection of plans.
#[derive(Debug, Default)]
pub struct PlansBuilder {
    plans: HashMap<String, PricingPlan>,
}

impl PlansBuilder {
    /// Create a new plans builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start defining a new plan.
    #[must_use]
    pub fn plan(self, id: &str) -> PlanBuilder {
        PlanBuilder {
            parent: self,
            id: id.to_string(),
            display_name: None,
            price: 0,
            currency: "usd".to_string(),
            interval: BillingInterval::Month,
            features: Vec::new(),
            price_ref: None,
        }
    }

    /// Build the plans collection.
    #[must_use]
    pub fn build(self) -> Plans {
        Plans { plans: self.plans }
    }

    fn add_plan(mut self, plan: PricingPlan) -> Self {
        self.plans.insert(plan.id.clone(), plan);
        self
    }
}

/// Builder for a single pricing plan.
#[derive(Debug)]
pub struct PlanBuilder {
    parent: PlansBuilder,
    id: String,
    display_name: Option<String>,
    price: i64,
    currency: String,
    interval: BillingInterval,
    features: Vec<String>,
    price_ref: Option<String>,
}

impl PlanBuilder {
    /// Set the display name.
    #[must_use]
    pub fn display_name(mut self, name: &str) -> Self {
        self.display_name = Some(name.to_string());
        self
    }

    /// Set the price in minor units and the currency code.
    #[must_use]
    pub fn price(mut self, amount: i64, currency: &str) -> Self {
        self.price = amount;
        self.currency = currency.to_lowercase();
        self
    }

    /// Set the billing interval.
    #[must_use]
    pub fn interval(mut self, interval: BillingInterval) -> Self {
        self.interval = interval;
        self
    }

    /// Add features to this plan.
    #[must_use]
    pub fn features<I, S>(mut self, features: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.features.extend(features.into_iter().map(Into::into));
        self
    }

    /// Add a single feature to this plan.
    #[must_use]
    pub fn feature(mut self, feature: &str) -> Self {
        self.features.push(feature.to_string());
        self
    }

    /// Set the external price reference at the billing provider.
    #[must_use]
    pub fn price_ref(mut self, price_ref: &str) -> Self {
        self.price_ref = Some(price_ref.to_string());
        self
    }

    /// Finish defining this plan and return to the parent builder.
    ///
    /// # Panics
    ///
    /// Panics if `price_ref` was not set.
    #[must_use]
    pub fn done(self) -> PlansBuilder {
        let plan = PricingPlan {
            display_name: self.display_name.unwrap_or_else(|| self.id.clone()),
            id: self.id,
            price: self.price,
            currency: self.currency,
            interval: self.interval,
            features: self.features,
            price_ref: self.price_ref.expect("price_ref is required for a plan"),
        };
        self.parent.add_plan(plan)
    }
}
