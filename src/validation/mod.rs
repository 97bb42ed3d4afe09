//! Validation gateway for untrusted external data.
//!
//! Every external payload — billing provider responses, synced customer
//! state, anything JSON-shaped from outside the process — passes through
//! this gate before it becomes a typed entity. The gate fails closed: a
//! payload with any invalid field is rejected as a whole, with a
//! [`ValidationError`] enumerating every field that failed and why. No
//! partially-valid payload ever produces a partially-built value.
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use subtrack_core::validation::gateway;
//!
//! let plan = gateway::pricing_plan(json!({
//!     "id": "plus_monthly",
//!     "displayName": "Subtrack Plus",
//!     "price": 499,
//!     "currency": "usd",
//!     "interval": "month",
//!     "features": ["renewal_alerts"],
//!     "priceRef": "price_plus_monthly",
//! })).unwrap();
//! assert_eq!(plan.id, "plus_monthly");
//!
//! let err = gateway::pricing_plan(json!({ "id": "plus_monthly" })).unwrap_err();
//! assert!(err.has_field("currency"));
//! assert!(err.has_field("price"));
//! ```

mod error;
pub mod gateway;
mod payloads;

pub use error::ValidationError;
pub use gateway::{customer_info, entitlement, pricing_plan, purchase_result};
