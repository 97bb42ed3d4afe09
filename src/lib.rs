//! Subtrack core - backend selection and entitlement modeling
//!
//! The data-access and billing core of the Subtrack subscription tracker:
//! an environment-driven backend switch, a closed feature-flag registry, a
//! typed billing/entitlement data model, and a fail-closed validation
//! gateway for untrusted wire payloads.
//!
//! # Features
//!
//! - **Backend selection**: `SUBTRACK_DATA_BACKEND` picks the data backend
//!   (mock or Firebase), defaulting to the in-memory mock
//! - **Feature flags**: a closed set of capability switches, all shipped
//!   disabled, consulted before touching any not-yet-wired integration
//! - **Billing model**: pricing plans, entitlements, customer state with a
//!   derived active-subscription set, and purchase outcomes
//! - **Validation gateway**: external payloads are validated whole, with
//!   structured per-field errors, before entering the typed model
//!
//! # Quick Start
//!
//! ```rust
//! use subtrack_core::{backend, ConfigBuilder};
//! use subtrack_core::billing::{BillingInterval, Plans};
//!
//! # fn main() -> subtrack_core::Result<()> {
//! // Initialize logging
//! subtrack_core::init_tracing();
//!
//! // Build configuration once, at startup
//! let config = ConfigBuilder::new().from_env().build()?;
//!
//! // Define the plan catalog
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
//! // Resolve the configured backend
//! let backend = backend::select(&config, plans)?;
//! # Ok(())
//! # }
//! ```

pub mod backend;
pub mod billing;
mod config;
mod error;
pub mod flags;
pub mod utils;
pub mod validation;

// Re-exports for public API
pub use backend::{BackendKind, BillingBackend, MockBackend};
pub use billing::{
    BillingError, BillingInterval, CheckoutOptions, CustomerInfo, Entitlement, PeriodType, Plans,
    PricingPlan, PurchaseResult, Store,
};
pub use config::{Config, ConfigBuilder, LoggingConfig, RuntimeEnv};
pub use error::{Result, SubtrackError};
pub use flags::{FeatureFlag, FeatureFlags};
pub use validation::ValidationError;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main().
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "subtrack=debug")
/// - `SUBTRACK_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = std::env::var("SUBTRACK_LOG_JSON")
        .map(|v| v.parse::<bool>().unwrap_or(false))
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Initialize tracing with a custom configuration
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::new(&config.logging.level);

    if config.logging.json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}
