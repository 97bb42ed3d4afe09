//! Billing-specific error types.
//!
//! Granular errors for billing operations and for the invariants backend
//! adapters must uphold when producing entitlement state.

use std::fmt;

/// Billing-specific errors.
///
/// These carry more context than the crate-level error and convert into
/// [`SubtrackError`](crate::error::SubtrackError) at the API boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BillingError {
    // Lookup errors
    /// The specified plan was not found.
    PlanNotFound { plan_id: String },
    /// No plan matches the given external price reference.
    PriceRefNotFound { price_ref: String },

    // Invariant violations surfaced by adapters
    /// An entitlement claimed to be active but its expiration was already
    /// in the past at sync time.
    StaleEntitlement { entitlement_id: String },
    /// An active-subscription entry referenced an entitlement that is
    /// missing or inactive.
    ActiveSetDrift { entitlement_id: String },

    // General errors
    /// An unexpected internal error occurred.
    Internal { message: String },
}

impl fmt::Display for BillingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PlanNotFound { plan_id } => {
                write!(f, "Plan not found: {}", plan_id)
            }
            Self::PriceRefNotFound { price_ref } => {
                write!(f, "No plan matches price reference '{}'", price_ref)
            }
            Self::StaleEntitlement { entitlement_id } => {
                write!(
                    f,
                    "Entitlement '{}' is marked active but already expired at sync time",
                    entitlement_id
                )
            }
            Self::ActiveSetDrift { entitlement_id } => {
                write!(
                    f,
                    "Active subscription '{}' does not match an active entitlement",
                    entitlement_id
                )
            }
            Self::Internal { message } => {
                write!(f, "Internal billing error: {}", message)
            }
        }
    }
}

impl std::error::Error for BillingError {}

impl BillingError {
    /// Check if this error reports a broken data invariant rather than a
    /// failed lookup.
    #[must_use]
    pub fn is_invariant_violation(&self) -> bool {
        matches!(
            self,
            Self::StaleEntitlement { .. } | Self::ActiveSetDrift { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BillingError::PlanNotFound {
            plan_id: "plus_monthly".to_string(),
        };
        assert_eq!(err.to_string(), "Plan not found: plus_monthly");

        let err = BillingError::PriceRefNotFound {
            price_ref: "price_unknown".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "No plan matches price reference 'price_unknown'"
        );
    }

    #[test]
    fn test_invariant_classification() {
        assert!(BillingError::StaleEntitlement {
            entitlement_id: "plus".to_string()
        }
        .is_invariant_violation());
        assert!(BillingError::ActiveSetDrift {
            entitlement_id: "plus".to_string()
        }
        .is_invariant_violation());
        assert!(!BillingError::PlanNotFound {
            plan_id: "plus".to_string()
        }
        .is_invariant_violation());
    }

    #[test]
    fn test_convert_to_subtrack_error() {
        let err = BillingError::PlanNotFound {
            plan_id: "plus".to_string(),
        };
        let crate_err: crate::error::SubtrackError = err.into();
        assert!(matches!(
            crate_err,
            crate::error::SubtrackError::Billing(_)
        ));
    }
}
