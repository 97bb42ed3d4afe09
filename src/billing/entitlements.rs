//! Entitlement and customer state records.
//!
//! An [`Entitlement`] records a user's right to a paid capability, with
//! provenance (which store sold it) and temporal validity. A
//! [`CustomerInfo`] is the full per-user entitlement state, replaced
//! wholesale on every sync with the billing backend; it is never patched
//! incrementally.
//!
//! These are dumb records: the backend adapter that produces them is
//! responsible for temporal consistency (an active entitlement must not
//! carry a past expiration at sync time), and untrusted wire data must come
//! in through the [validation gateway](crate::validation).

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde::ser::SerializeStruct;

/// The store an entitlement was purchased through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    AppStore,
    PlayStore,
    Stripe,
    /// Granted without a purchase (e.g., a promo code or support comp).
    Promotional,
}

impl Store {
    /// Parse from the wire representation. Unknown stores are rejected.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "app_store" => Some(Self::AppStore),
            "play_store" => Some(Self::PlayStore),
            "stripe" => Some(Self::Stripe),
            "promotional" => Some(Self::Promotional),
            _ => None,
        }
    }

    /// Convert to the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AppStore => "app_store",
            Self::PlayStore => "play_store",
            Self::Stripe => "stripe",
            Self::Promotional => "promotional",
        }
    }
}

impl std::fmt::Display for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The billing period type of an entitlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// A regular paid period.
    Normal,
    /// A free trial period.
    Trial,
    /// An introductory-price period.
    Intro,
}

impl PeriodType {
    /// Parse from the wire representation. Unknown period types are rejected.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "normal" => Some(Self::Normal),
            "trial" => Some(Self::Trial),
            "intro" => Some(Self::Intro),
            _ => None,
        }
    }

    /// Convert to the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Trial => "trial",
            Self::Intro => "intro",
        }
    }
}

impl std::fmt::Display for PeriodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A user's right to a paid capability.
///
/// Owned by a [`CustomerInfo`]; replaced wholesale on each backend sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Entitlement {
    /// Entitlement identifier (e.g., "plus").
    pub id: String,
    /// Whether the entitlement currently grants access.
    pub is_active: bool,
    /// Whether the underlying subscription will renew.
    pub will_renew: bool,
    /// Billing period type.
    pub period_type: PeriodType,
    /// When the entitlement was purchased (None for granted entitlements
    /// with no purchase event).
    pub purchase_date: Option<DateTime<Utc>>,
    /// When the entitlement expires (None = non-expiring).
    pub expiration_date: Option<DateTime<Utc>>,
    /// The store that sold it.
    pub store: Store,
    /// Product identifier at the store.
    pub product_id: String,
    /// Whether this came from a sandbox/test environment.
    pub is_sandbox: bool,
}

impl Entitlement {
    /// Check temporal consistency against a sync timestamp: an active
    /// entitlement must be non-expiring or expire in the future.
    ///
    /// Backend adapters call this before handing out instances; the record
    /// itself never self-enforces.
    #[must_use]
    pub fn is_consistent_at(&self, sync_time: DateTime<Utc>) -> bool {
        if !self.is_active {
            return true;
        }
        match self.expiration_date {
            None => true,
            Some(expires) => expires > sync_time,
        }
    }
}

/// Full per-user entitlement state.
///
/// `active_subscriptions` is derived, not stored: it is recomputed from the
/// entitlement map on every access, so it can never drift from the
/// entitlements it summarizes. Serialization emits the derived array so wire
/// consumers still see the denormalized shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerInfo {
    user_id: String,
    entitlements: BTreeMap<String, Entitlement>,
    purchase_dates: BTreeMap<String, DateTime<Utc>>,
    latest_expiration_date: Option<DateTime<Utc>>,
    original_purchase_date: Option<DateTime<Utc>>,
}

impl CustomerInfo {
    /// A customer with no entitlements.
    #[must_use]
    pub fn empty(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            entitlements: BTreeMap::new(),
            purchase_dates: BTreeMap::new(),
            latest_expiration_date: None,
            original_purchase_date: None,
        }
    }

    /// Assemble a customer from its parts.
    ///
    /// Entitlements are keyed by their own `id`, so the map key can never
    /// disagree with the record it points at.
    #[must_use]
    pub fn from_parts(
        user_id: impl Into<String>,
        entitlements: impl IntoIterator<Item = Entitlement>,
        purchase_dates: impl IntoIterator<Item = (String, DateTime<Utc>)>,
        latest_expiration_date: Option<DateTime<Utc>>,
        original_purchase_date: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            entitlements: entitlements
                .into_iter()
                .map(|e| (e.id.clone(), e))
                .collect(),
            purchase_dates: purchase_dates.into_iter().collect(),
            latest_expiration_date,
            original_purchase_date,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// All entitlements, keyed by entitlement ID.
    #[must_use]
    pub fn entitlements(&self) -> &BTreeMap<String, Entitlement> {
        &self.entitlements
    }

    /// Get a single entitlement.
    #[must_use]
    pub fn entitlement(&self, id: &str) -> Option<&Entitlement> {
        self.entitlements.get(id)
    }

    /// The set of entitlement IDs that are currently active.
    ///
    /// Computed on access; there is no stored field to fall out of sync.
    #[must_use]
    pub fn active_subscriptions(&self) -> BTreeSet<&str> {
        self.entitlements
            .values()
            .filter(|e| e.is_active)
            .map(|e| e.id.as_str())
            .collect()
    }

    /// Check whether a specific entitlement is active.
    #[must_use]
    pub fn is_entitled(&self, id: &str) -> bool {
        self.entitlements.get(id).is_some_and(|e| e.is_active)
    }

    /// Last purchase date per product identifier.
    #[must_use]
    pub fn purchase_dates(&self) -> &BTreeMap<String, DateTime<Utc>> {
        &self.purchase_dates
    }

    #[must_use]
    pub fn latest_expiration_date(&self) -> Option<DateTime<Utc>> {
        self.latest_expiration_date
    }

    #[must_use]
    pub fn original_purchase_date(&self) -> Option<DateTime<Utc>> {
        self.original_purchase_date
    }
}

impl Serialize for CustomerInfo {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CustomerInfo", 6)?;
        state.serialize_field("userId", &self.user_id)?;
        state.serialize_field("entitlements", &self.entitlements)?;
        state.serialize_field("activeSubscriptions", &self.active_subscriptions())?;
        state.serialize_field("purchaseDates", &self.purchase_dates)?;
        state.serialize_field("latestExpirationDate", &self.latest_expiration_date)?;
        state.serialize_field("originalPurchaseDate", &self.original_purchase_date)?;
        state.end()
    }
}
