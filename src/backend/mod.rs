//! Data backend selection and the backend contract.
//!
//! The application talks to its billing/data backend only through the
//! [`BillingBackend`] trait. Which implementation satisfies the contract is
//! decided once at startup from build-time environment configuration: the
//! in-memory [`MockBackend`] (the shipped default) or, eventually, a live
//! Firebase-backed implementation gated behind
//! [`FeatureFlag::FirebaseAuth`](crate::flags::FeatureFlag).
//!
//! # Example
//!
//! ```rust
//! use subtrack_core::backend::{self, BackendKind};
//! use subtrack_core::billing::Plans;
//! use subtrack_core::ConfigBuilder;
//!
//! # fn main() -> subtrack_core::Result<()> {
//! let config = ConfigBuilder::new().build()?;
//! let backend = backend::select(&config, Plans::new())?;
//! assert_eq!(backend.kind(), BackendKind::Mock);
//! # Ok(())
//! # }
//! ```

pub mod mock;

pub use mock::MockBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::billing::{CheckoutOptions, CustomerInfo, PricingPlan, PurchaseResult};
use crate::config::Config;
use crate::error::{Result, SubtrackError};
use crate::flags::FeatureFlag;
use crate::utils::get_env_with_prefix;

/// The concrete data backend satisfying the billing/data contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// In-memory fixture backend.
    Mock,
    /// Live Firebase backend (not yet wired).
    Firebase,
}

impl Default for BackendKind {
    fn default() -> Self {
        Self::Mock
    }
}

impl BackendKind {
    /// Resolve from the `SUBTRACK_DATA_BACKEND` environment variable.
    ///
    /// Absent or unrecognized values fall back to [`Self::Mock`]. The
    /// fallback is silent: builds without backend configuration are valid
    /// and get the mock backend.
    #[must_use]
    pub fn from_env() -> Self {
        match get_env_with_prefix("DATA_BACKEND") {
            Some(value) => Self::parse(&value).unwrap_or(Self::Mock),
            None => Self::Mock,
        }
    }

    /// Parse a backend name, case-insensitively.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "mock" => Some(Self::Mock),
            "firebase" => Some(Self::Firebase),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mock => "mock",
            Self::Firebase => "firebase",
        }
    }
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The contract every data backend implements.
///
/// Implementations may run syncs concurrently for different users but must
/// replace a user's [`CustomerInfo`] atomically and wholesale; interleaved
/// partial writes to one user's state are not allowed.
#[async_trait]
pub trait BillingBackend: Send + Sync + std::fmt::Debug {
    /// Which backend this is.
    fn kind(&self) -> BackendKind;

    /// The pricing plans on offer.
    async fn plans(&self) -> Result<Vec<PricingPlan>>;

    /// Fetch the current entitlement state for a user.
    ///
    /// Users the backend has never seen yield an empty [`CustomerInfo`],
    /// not an error.
    async fn customer_info(&self, user_id: &str) -> Result<CustomerInfo>;

    /// Attempt a purchase for a user.
    ///
    /// Provider-level declines surface as [`PurchaseResult::Failure`];
    /// `Err` is reserved for caller mistakes and infrastructure faults.
    async fn purchase(&self, user_id: &str, options: &CheckoutOptions) -> Result<PurchaseResult>;

    /// Re-sync entitlement state from the provider's records.
    async fn restore(&self, user_id: &str) -> Result<CustomerInfo>;
}

/// Select the backend implementation for the given configuration.
///
/// # Errors
///
/// The Firebase selection is gated: with
/// [`FeatureFlag::FirebaseAuth`](crate::flags::FeatureFlag::FirebaseAuth)
/// disabled (the shipped default) it returns
/// [`SubtrackError::FeatureDisabled`] so callers do not attempt the path at
/// all; with the flag enabled it returns
/// [`SubtrackError::BackendUnavailable`] until a live implementation is
/// wired in.
pub fn select(
    config: &Config,
    plans: crate::billing::Plans,
) -> Result<Box<dyn BillingBackend>> {
    match config.backend {
        BackendKind::Mock => {
            tracing::debug!(target: "subtrack::backend", "selected mock data backend");
            Ok(Box::new(MockBackend::new(plans)))
        }
        BackendKind::Firebase => {
            if !config.flags.is_enabled(FeatureFlag::FirebaseAuth) {
                return Err(SubtrackError::feature_disabled(FeatureFlag::FirebaseAuth));
            }
            Err(SubtrackError::backend_unavailable(
                BackendKind::Firebase,
                "no live implementation is wired in",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[test]
    fn test_parse_backend_kind() {
        assert_eq!(BackendKind::parse("mock"), Some(BackendKind::Mock));
        assert_eq!(BackendKind::parse("MOCK"), Some(BackendKind::Mock));
        assert_eq!(BackendKind::parse("firebase"), Some(BackendKind::Firebase));
        assert_eq!(BackendKind::parse("Firebase"), Some(BackendKind::Firebase));
        assert_eq!(BackendKind::parse("supabase"), None);
        assert_eq!(BackendKind::parse(""), None);
    }

    #[test]
    fn test_select_mock() {
        let config = ConfigBuilder::new().build().unwrap();
        let backend = select(&config, crate::billing::Plans::new()).unwrap();
        assert_eq!(backend.kind(), BackendKind::Mock);
    }

    #[test]
    fn test_select_firebase_gated_by_flag() {
        let config = ConfigBuilder::new()
            .with_backend(BackendKind::Firebase)
            .build()
            .unwrap();

        let err = select(&config, crate::billing::Plans::new()).unwrap_err();
        assert!(matches!(
            err,
            SubtrackError::FeatureDisabled {
                flag: FeatureFlag::FirebaseAuth
            }
        ));
    }

    #[test]
    fn test_select_firebase_with_flag_enabled_is_unavailable() {
        let config = ConfigBuilder::new()
            .with_backend(BackendKind::Firebase)
            .enable_flag(FeatureFlag::FirebaseAuth)
            .build()
            .unwrap();

        let err = select(&config, crate::billing::Plans::new()).unwrap_err();
        assert!(matches!(err, SubtrackError::BackendUnavailable { .. }));
    }
}
