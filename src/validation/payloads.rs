//! Wire payload shapes and their conversion into the typed model.
//!
//! Every field of a payload struct is optional so that a single pass can
//! report *all* missing and invalid fields, rather than stopping at the
//! first. Field-level rules run through the `validator` derive; enum
//! membership, date parsing, and cross-field invariants run during
//! conversion, accumulating into the same [`ValidationError`].

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use validator::Validate;

use super::ValidationError;
use crate::billing::{
    BillingInterval, CustomerInfo, Entitlement, PeriodType, PricingPlan, PurchaseResult, Store,
};

/// Conversion from a deserialized payload into a typed entity.
///
/// Returns `None` when the entity could not be assembled; every reason is
/// recorded in `err` first.
pub(super) trait FromPayload<P>: Sized {
    fn from_payload(payload: P, err: &mut ValidationError) -> Option<Self>;
}

/// Currencies accepted for pricing plans (ISO-4217, lowercase).
const VALID_CURRENCIES: &[&str] = &[
    "usd", "eur", "gbp", "cad", "aud", "jpy", "chf", "sek", "nok", "dkk",
    "nzd", "sgd", "hkd", "inr", "brl", "mxn", "pln", "czk", "huf", "ron",
];

fn require<T>(err: &mut ValidationError, field: &str, value: Option<T>) -> Option<T> {
    if value.is_none() {
        err.add(field, "is required");
    }
    value
}

/// Parse a nullable ISO-8601 date field.
///
/// Outer `None` means the field failed; inner `None` means the field was
/// legitimately null/absent.
fn parse_nullable_date(
    err: &mut ValidationError,
    field: &str,
    value: Option<String>,
) -> Option<Option<DateTime<Utc>>> {
    match value {
        None => Some(None),
        Some(s) => match DateTime::parse_from_rfc3339(&s) {
            Ok(dt) => Some(Some(dt.with_timezone(&Utc))),
            Err(_) => {
                err.add(field, format!("'{}' is not an ISO-8601 timestamp", s));
                None
            }
        },
    }
}

fn parse_date(err: &mut ValidationError, field: &str, value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc3339(value) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(_) => {
            err.add(field, format!("'{}' is not an ISO-8601 timestamp", value));
            None
        }
    }
}

// =============================================================================
// PricingPlan
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct PricingPlanPayload {
    #[validate(length(min = 1, max = 64))]
    id: Option<String>,
    #[validate(length(min = 1, max = 128))]
    display_name: Option<String>,
    #[validate(range(min = 0))]
    price: Option<i64>,
    currency: Option<String>,
    interval: Option<String>,
    features: Option<Vec<String>>,
    #[validate(length(min = 1, max = 256))]
    price_ref: Option<String>,
}

impl FromPayload<PricingPlanPayload> for PricingPlan {
    fn from_payload(payload: PricingPlanPayload, err: &mut ValidationError) -> Option<Self> {
        let id = require(err, "id", payload.id);
        let display_name = require(err, "displayName", payload.display_name);
        let price = require(err, "price", payload.price);

        let currency = require(err, "currency", payload.currency).and_then(|c| {
            if VALID_CURRENCIES.contains(&c.as_str()) {
                Some(c)
            } else {
                err.add(
                    "currency",
                    format!("'{}' is not a recognized lowercase ISO-4217 code", c),
                );
                None
            }
        });

        let interval = require(err, "interval", payload.interval).and_then(|s| {
            BillingInterval::parse(&s).or_else(|| {
                err.add("interval", format!("'{}' must be one of: month, year", s));
                None
            })
        });

        let features = require(err, "features", payload.features);
        let price_ref = require(err, "priceRef", payload.price_ref);

        Some(Self {
            id: id?,
            display_name: display_name?,
            price: price?,
            currency: currency?,
            interval: interval?,
            features: features?,
            price_ref: price_ref?,
        })
    }
}

// =============================================================================
// Entitlement
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct EntitlementPayload {
    #[validate(length(min = 1, max = 64))]
    id: Option<String>,
    is_active: Option<bool>,
    will_renew: Option<bool>,
    period_type: Option<String>,
    purchase_date: Option<String>,
    expiration_date: Option<String>,
    store: Option<String>,
    #[validate(length(min = 1, max = 256))]
    product_id: Option<String>,
    is_sandbox: Option<bool>,
}

impl FromPayload<EntitlementPayload> for Entitlement {
    fn from_payload(payload: EntitlementPayload, err: &mut ValidationError) -> Option<Self> {
        let id = require(err, "id", payload.id);
        let is_active = require(err, "isActive", payload.is_active);
        let will_renew = require(err, "willRenew", payload.will_renew);

        let period_type = require(err, "periodType", payload.period_type).and_then(|s| {
            PeriodType::parse(&s).or_else(|| {
                err.add(
                    "periodType",
                    format!("'{}' must be one of: normal, trial, intro", s),
                );
                None
            })
        });

        let purchase_date = parse_nullable_date(err, "purchaseDate", payload.purchase_date);
        let expiration_date = parse_nullable_date(err, "expirationDate", payload.expiration_date);

        let store = require(err, "store", payload.store).and_then(|s| {
            Store::parse(&s).or_else(|| {
                err.add(
                    "store",
                    format!(
                        "'{}' must be one of: app_store, play_store, stripe, promotional",
                        s
                    ),
                );
                None
            })
        });

        let product_id = require(err, "productId", payload.product_id);
        let is_sandbox = require(err, "isSandbox", payload.is_sandbox);

        Some(Self {
            id: id?,
            is_active: is_active?,
            will_renew: will_renew?,
            period_type: period_type?,
            purchase_date: purchase_date?,
            expiration_date: expiration_date?,
            store: store?,
            product_id: product_id?,
            is_sandbox: is_sandbox?,
        })
    }
}

// =============================================================================
// CustomerInfo
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct CustomerInfoPayload {
    #[validate(length(min = 1, max = 256))]
    user_id: Option<String>,
    entitlements: Option<BTreeMap<String, EntitlementPayload>>,
    active_subscriptions: Option<Vec<String>>,
    purchase_dates: Option<BTreeMap<String, String>>,
    latest_expiration_date: Option<String>,
    original_purchase_date: Option<String>,
}

impl FromPayload<CustomerInfoPayload> for CustomerInfo {
    fn from_payload(payload: CustomerInfoPayload, err: &mut ValidationError) -> Option<Self> {
        let user_id = require(err, "userId", payload.user_id);

        // Validate and convert each entitlement, nesting its failures under
        // `entitlements.<key>`.
        let mut entitlements: Option<Vec<Entitlement>> = None;
        if let Some(map) = require(err, "entitlements", payload.entitlements) {
            let mut converted = Vec::with_capacity(map.len());
            let mut all_ok = true;

            for (key, entitlement_payload) in map {
                let prefix = format!("entitlements.{}", key);

                let mut sub = ValidationError::new("Entitlement");
                if let Err(field_errors) = entitlement_payload.validate() {
                    sub.extend_from_validator(&field_errors);
                }
                match Entitlement::from_payload(entitlement_payload, &mut sub) {
                    Some(entitlement) if sub.is_empty() => {
                        if entitlement.id == key {
                            converted.push(entitlement);
                        } else {
                            err.add(format!("{}.id", prefix), "must match its map key");
                            all_ok = false;
                        }
                    }
                    _ => {
                        err.extend_prefixed(&prefix, sub);
                        all_ok = false;
                    }
                }
            }

            if all_ok {
                entitlements = Some(converted);
            }
        }

        // The denormalized active set on the wire must agree with the
        // derivation; drift is rejected, never repaired.
        let declared = require(err, "activeSubscriptions", payload.active_subscriptions);
        if let (Some(declared), Some(entitlements)) = (&declared, &entitlements) {
            let declared_set: BTreeSet<&str> = declared.iter().map(String::as_str).collect();
            if declared_set.len() != declared.len() {
                err.add("activeSubscriptions", "contains duplicate identifiers");
            }

            let derived: BTreeSet<&str> = entitlements
                .iter()
                .filter(|e| e.is_active)
                .map(|e| e.id.as_str())
                .collect();

            for extra in declared_set.difference(&derived) {
                err.add(
                    "activeSubscriptions",
                    format!("'{}' does not correspond to an active entitlement", extra),
                );
            }
            for missing in derived.difference(&declared_set) {
                err.add(
                    "activeSubscriptions",
                    format!("active entitlement '{}' is missing from the set", missing),
                );
            }
        }

        let purchase_dates = require(err, "purchaseDates", payload.purchase_dates).and_then(
            |map| {
                let mut parsed = BTreeMap::new();
                let mut all_ok = true;
                for (product_id, date) in map {
                    let field = format!("purchaseDates.{}", product_id);
                    match parse_date(err, &field, &date) {
                        Some(dt) => {
                            parsed.insert(product_id, dt);
                        }
                        None => all_ok = false,
                    }
                }
                all_ok.then_some(parsed)
            },
        );

        let latest_expiration_date =
            parse_nullable_date(err, "latestExpirationDate", payload.latest_expiration_date);
        let original_purchase_date =
            parse_nullable_date(err, "originalPurchaseDate", payload.original_purchase_date);

        if !err.is_empty() {
            return None;
        }

        Some(CustomerInfo::from_parts(
            user_id?,
            entitlements?,
            purchase_dates?,
            latest_expiration_date?,
            original_purchase_date?,
        ))
    }
}

// =============================================================================
// PurchaseResult
// =============================================================================

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(super) struct PurchaseResultPayload {
    success: Option<bool>,
    #[validate(length(min = 1))]
    transaction_id: Option<String>,
    #[validate(length(min = 1))]
    error: Option<String>,
}

impl FromPayload<PurchaseResultPayload> for PurchaseResult {
    fn from_payload(payload: PurchaseResultPayload, err: &mut ValidationError) -> Option<Self> {
        match require(err, "success", payload.success)? {
            true => {
                if payload.error.is_some() {
                    err.add("error", "must not be set on a successful result");
                }
                match payload.transaction_id {
                    Some(transaction_id) if err.is_empty() => {
                        Some(Self::Success { transaction_id })
                    }
                    Some(_) => None,
                    None => {
                        err.add("transactionId", "is required on a successful result");
                        None
                    }
                }
            }
            false => {
                if payload.transaction_id.is_some() {
                    err.add("transactionId", "must not be set on a failed result");
                }
                match payload.error {
                    Some(error) if err.is_empty() => Some(Self::Failure { error }),
                    Some(_) => None,
                    None => {
                        err.add("error", "is required on a failed result");
                        None
                    }
                }
            }
        }
    }
}
