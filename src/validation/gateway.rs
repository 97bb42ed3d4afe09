//! Gateway entry points.
//!
//! One function per entity. Each takes an untrusted `serde_json::Value` and
//! returns either the fully-typed entity or a [`ValidationError`] listing
//! every failing field. There is no partial construction: any failure
//! rejects the whole payload.

use serde::de::DeserializeOwned;
use validator::Validate;

use super::error::ValidationError;
use super::payloads::{
    CustomerInfoPayload, EntitlementPayload, FromPayload, PricingPlanPayload,
    PurchaseResultPayload,
};
use crate::billing::{CustomerInfo, Entitlement, PricingPlan, PurchaseResult};

fn validate_payload<P, T>(
    entity: &'static str,
    value: serde_json::Value,
) -> Result<T, ValidationError>
where
    P: DeserializeOwned + Validate,
    T: FromPayload<P>,
{
    let payload: P = serde_json::from_value(value)
        .map_err(|e| ValidationError::malformed(entity, e.to_string()))?;

    let mut err = ValidationError::new(entity);
    if let Err(field_errors) = payload.validate() {
        err.extend_from_validator(&field_errors);
    }

    match (T::from_payload(payload, &mut err), err.is_empty()) {
        (Some(typed), true) => Ok(typed),
        (_, false) => Err(err),
        (None, true) => Err(err.with_field("payload", "could not be constructed")),
    }
}

/// Validate a pricing plan payload.
pub fn pricing_plan(value: serde_json::Value) -> Result<PricingPlan, ValidationError> {
    validate_payload::<PricingPlanPayload, _>("PricingPlan", value)
}

/// Validate an entitlement payload.
pub fn entitlement(value: serde_json::Value) -> Result<Entitlement, ValidationError> {
    validate_payload::<EntitlementPayload, _>("Entitlement", value)
}

/// Validate a customer info payload, including the cross-check that its
/// denormalized `activeSubscriptions` array agrees with the entitlement map.
pub fn customer_info(value: serde_json::Value) -> Result<CustomerInfo, ValidationError> {
    validate_payload::<CustomerInfoPayload, _>("CustomerInfo", value)
}

/// Validate a purchase result payload, enforcing that exactly one of
/// `transactionId` / `error` is populated, matching the `success` flag.
pub fn purchase_result(value: serde_json::Value) -> Result<PurchaseResult, ValidationError> {
    validate_payload::<PurchaseResultPayload, _>("PurchaseResult", value)
}
