//! Purchase outcomes and checkout options.

use std::collections::BTreeMap;

use serde::Serialize;
use serde::ser::SerializeStruct;

/// The outcome of a purchase attempt.
///
/// A success always carries a transaction identifier and a failure always
/// carries an error description; the type makes any other combination
/// unrepresentable. Wire payloads claiming both (or neither) are rejected by
/// the [validation gateway](crate::validation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchaseResult {
    Success { transaction_id: String },
    Failure { error: String },
}

impl Serialize for PurchaseResult {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("PurchaseResult", 2)?;
        match self {
            Self::Success { transaction_id } => {
                state.serialize_field("success", &true)?;
                state.serialize_field("transactionId", transaction_id)?;
            }
            Self::Failure { error } => {
                state.serialize_field("success", &false)?;
                state.serialize_field("error", error)?;
            }
        }
        state.end()
    }
}

impl PurchaseResult {
    /// Build a successful result.
    #[must_use]
    pub fn success(transaction_id: impl Into<String>) -> Self {
        Self::Success {
            transaction_id: transaction_id.into(),
        }
    }

    /// Build a failed result.
    #[must_use]
    pub fn failure(error: impl Into<String>) -> Self {
        Self::Failure {
            error: error.into(),
        }
    }

    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The transaction identifier, present iff the purchase succeeded.
    #[must_use]
    pub fn transaction_id(&self) -> Option<&str> {
        match self {
            Self::Success { transaction_id } => Some(transaction_id),
            Self::Failure { .. } => None,
        }
    }

    /// The error description, present iff the purchase failed.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match self {
            Self::Success { .. } => None,
            Self::Failure { error } => Some(error),
        }
    }
}

/// Options for a checkout attempt.
///
/// The metadata map is forwarded to the billing provider verbatim; the core
/// never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutOptions {
    /// External price reference to purchase.
    pub price_ref: String,
    /// Opaque key-value metadata for the provider.
    pub metadata: BTreeMap<String, String>,
}

impl CheckoutOptions {
    /// Checkout for a price reference with no metadata.
    #[must_use]
    pub fn new(price_ref: impl Into<String>) -> Self {
        Self {
            price_ref: price_ref.into(),
            metadata: BTreeMap::new(),
        }
    }

    /// Attach a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_has_no_error() {
        let result = PurchaseResult::success("tx1");
        assert!(result.is_success());
        assert_eq!(result.transaction_id(), Some("tx1"));
        assert_eq!(result.error(), None);
    }

    #[test]
    fn test_failure_has_no_transaction() {
        let result = PurchaseResult::failure("declined");
        assert!(!result.is_success());
        assert_eq!(result.transaction_id(), None);
        assert_eq!(result.error(), Some("declined"));
    }

    #[test]
    fn test_wire_shape() {
        let value = serde_json::to_value(PurchaseResult::success("tx1")).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["transactionId"], "tx1");
        assert!(value.get("error").is_none());

        let value = serde_json::to_value(PurchaseResult::failure("declined")).unwrap();
        assert_eq!(value["success"], false);
        assert_eq!(value["error"], "declined");
        assert!(value.get("transactionId").is_none());
    }

    #[test]
    fn test_checkout_metadata_preserved() {
        let options = CheckoutOptions::new("price_plus_monthly")
            .with_metadata("campaign", "spring_promo")
            .with_metadata("referrer", "onboarding");

        assert_eq!(options.price_ref, "price_plus_monthly");
        assert_eq!(options.metadata.get("campaign").map(String::as_str), Some("spring_promo"));
        assert_eq!(options.metadata.get("referrer").map(String::as_str), Some("onboarding"));
    }
}
