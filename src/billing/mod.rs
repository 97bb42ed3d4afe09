//! Typed billing and entitlement data model.
//!
//! The shared representation of subscription plans, per-user entitlement
//! state, and purchase outcomes, consumed by every backend implementation
//! (mock or real). These types carry no behavior beyond construction,
//! derivation, and equality; untrusted external data enters only through the
//! [validation gateway](crate::validation).
//!
//! # Example
//!
//! ```rust
//! use subtrack_core::billing::{BillingInterval, CheckoutOptions, Plans};
//!
//! let plans = Plans::builder()
//!     .plan("plus_monthly")
//!         .display_name("Subtrack Plus")
//!         .price(499, "usd")
//!         .interval(BillingInterval::Month)
//!         .features(["unlimited_subscriptions", "renewal_alerts"])
//!         .price_ref("price_plus_monthly")
//!         .done()
//!     .build();
//!
//! let options = CheckoutOptions::new("price_plus_monthly")
//!     .with_metadata("campaign", "spring_promo");
//! ```

pub mod entitlements;
pub mod error;
pub mod plans;
pub mod purchase;

// Plan exports
pub use plans::{BillingInterval, PlanBuilder, Plans, PlansBuilder, PricingPlan};

// Entitlement exports
pub use entitlements::{CustomerInfo, Entitlement, PeriodType, Store};

// Purchase exports
pub use purchase::{CheckoutOptions, PurchaseResult};

// Error exports
pub use error::BillingError;
