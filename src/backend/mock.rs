//! In-memory mock data backend.
//!
//! The shipped default backend: serves the configured plans, fabricates
//! purchases, and keeps per-user [`CustomerInfo`] in memory. State lives
//! behind an `Arc`, so clones are cheap and share one store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use super::{BackendKind, BillingBackend};
use crate::billing::{
    BillingError, BillingInterval, CheckoutOptions, CustomerInfo, Entitlement, PeriodType, Plans,
    PricingPlan, PurchaseResult, Store,
};
use crate::error::Result;

/// Mock billing/data backend.
#[derive(Clone, Debug)]
pub struct MockBackend {
    inner: Arc<MockBackendInner>,
}

#[derive(Debug)]
struct MockBackendInner {
    plans: Plans,
    customers: RwLock<BTreeMap<String, CustomerInfo>>,
    txn_counter: AtomicU64,
    fail_next_purchase: Mutex<Option<String>>,
}

impl MockBackend {
    /// Create a mock backend serving the given plans.
    #[must_use]
    pub fn new(plans: Plans) -> Self {
        Self {
            inner: Arc::new(MockBackendInner {
                plans,
                customers: RwLock::new(BTreeMap::new()),
                txn_counter: AtomicU64::new(0),
                fail_next_purchase: Mutex::new(None),
            }),
        }
    }

    /// Create a mock backend with a small default plan catalog.
    #[must_use]
    pub fn with_default_plans() -> Self {
        Self::new(default_plans())
    }

    /// Seed a user's entitlement state.
    ///
    /// Rejects state that violates the adapter obligation: an active
    /// entitlement whose expiration is already in the past.
    pub fn seed_customer(&self, info: CustomerInfo) -> Result<()> {
        let now = Utc::now();
        for entitlement in info.entitlements().values() {
            if !entitlement.is_consistent_at(now) {
                return Err(BillingError::StaleEntitlement {
                    entitlement_id: entitlement.id.clone(),
                }
                .into());
            }
        }
        self.inner
            .customers
            .write()
            .unwrap()
            .insert(info.user_id().to_string(), info);
        Ok(())
    }

    /// Make the next purchase attempt fail with the given provider error.
    pub fn fail_next_purchase(&self, reason: impl Into<String>) {
        *self.inner.fail_next_purchase.lock().unwrap() = Some(reason.into());
    }

    fn next_transaction_id(&self) -> String {
        let n = self.inner.txn_counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("txn_mock_{}", n)
    }

    fn entitlement_for(&self, plan: &PricingPlan, now: DateTime<Utc>) -> Entitlement {
        let expires = match plan.interval {
            BillingInterval::Month => now + Duration::days(30),
            BillingInterval::Year => now + Duration::days(365),
        };
        Entitlement {
            id: plan.id.clone(),
            is_active: true,
            will_renew: true,
            period_type: PeriodType::Normal,
            purchase_date: Some(now),
            expiration_date: Some(expires),
            store: Store::AppStore,
            product_id: plan.price_ref.clone(),
            is_sandbox: true,
        }
    }
}

#[async_trait]
impl BillingBackend for MockBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Mock
    }

    async fn plans(&self) -> Result<Vec<PricingPlan>> {
        Ok(self.inner.plans.iter().map(|(_, p)| p.clone()).collect())
    }

    async fn customer_info(&self, user_id: &str) -> Result<CustomerInfo> {
        Ok(self
            .inner
            .customers
            .read()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_else(|| CustomerInfo::empty(user_id)))
    }

    async fn purchase(&self, user_id: &str, options: &CheckoutOptions) -> Result<PurchaseResult> {
        // Forced provider decline, for tests.
        if let Some(reason) = self.inner.fail_next_purchase.lock().unwrap().take() {
            tracing::debug!(
                target: "subtrack::backend",
                user_id = %user_id,
                "mock purchase declined: {}", reason
            );
            return Ok(PurchaseResult::failure(reason));
        }

        let plan = self
            .inner
            .plans
            .find_by_price_ref(&options.price_ref)
            .ok_or_else(|| BillingError::PriceRefNotFound {
                price_ref: options.price_ref.clone(),
            })?
            .clone();

        let now = Utc::now();
        let entitlement = self.entitlement_for(&plan, now);
        let transaction_id = self.next_transaction_id();

        // Replace the user's state wholesale under one write lock; no
        // interleaved partial writes are observable.
        {
            let mut customers = self.inner.customers.write().unwrap();
            let previous = customers
                .remove(user_id)
                .unwrap_or_else(|| CustomerInfo::empty(user_id));

            let mut entitlements: Vec<Entitlement> =
                previous.entitlements().values().cloned().collect();
            entitlements.retain(|e| e.id != entitlement.id);
            entitlements.push(entitlement);

            let mut purchase_dates = previous.purchase_dates().clone();
            purchase_dates.insert(plan.price_ref.clone(), now);

            let latest_expiration = entitlements
                .iter()
                .filter_map(|e| e.expiration_date)
                .max();

            let replacement = CustomerInfo::from_parts(
                user_id,
                entitlements,
                purchase_dates,
                latest_expiration,
                previous.original_purchase_date().or(Some(now)),
            );
            customers.insert(user_id.to_string(), replacement);
        }

        tracing::debug!(
            target: "subtrack::backend",
            user_id = %user_id,
            plan_id = %plan.id,
            transaction_id = %transaction_id,
            "mock purchase completed"
        );

        Ok(PurchaseResult::success(transaction_id))
    }

    async fn restore(&self, user_id: &str) -> Result<CustomerInfo> {
        // The mock has no external provider to consult; restoring returns
        // the current in-memory state.
        self.customer_info(user_id).await
    }
}

/// The default mock plan catalog.
#[must_use]
pub fn default_plans() -> Plans {
    Plans::builder()
        .plan("plus_monthly")
        .display_name("Subtrack Plus")
        .price(499, "usd")
        .interval(BillingInterval::Month)
        .features(["unlimited_subscriptions", "renewal_alerts"])
        .price_ref("price_plus_monthly")
        .done()
        .plan("plus_annual")
        .display_name("Subtrack Plus (Annual)")
        .price(3999, "usd")
        .interval(BillingInterval::Year)
        .features(["unlimited_subscriptions", "renewal_alerts", "spend_reports"])
        .price_ref("price_plus_annual")
        .done()
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_default_plans_catalog() {
        let backend = MockBackend::with_default_plans();
        let plans = backend.plans().await.unwrap();
        assert_eq!(plans.len(), 2);
    }

    #[tokio::test]
    async fn test_unknown_user_gets_empty_info() {
        let backend = MockBackend::with_default_plans();
        let info = backend.customer_info("user_unknown").await.unwrap();
        assert_eq!(info.user_id(), "user_unknown");
        assert!(info.entitlements().is_empty());
        assert!(info.active_subscriptions().is_empty());
    }

    #[tokio::test]
    async fn test_purchase_creates_active_entitlement() {
        let backend = MockBackend::with_default_plans();
        let options = CheckoutOptions::new("price_plus_monthly");

        let result = backend.purchase("user_1", &options).await.unwrap();
        assert!(result.is_success());
        assert_eq!(result.transaction_id(), Some("txn_mock_1"));

        let info = backend.customer_info("user_1").await.unwrap();
        assert!(info.is_entitled("plus_monthly"));
        assert_eq!(
            info.active_subscriptions(),
            std::collections::BTreeSet::from(["plus_monthly"])
        );

        let entitlement = info.entitlement("plus_monthly").unwrap();
        assert!(entitlement.is_consistent_at(Utc::now()));
        assert!(entitlement.is_sandbox);
        assert_eq!(entitlement.product_id, "price_plus_monthly");
    }

    #[tokio::test]
    async fn test_purchase_unknown_price_ref_is_an_error() {
        let backend = MockBackend::with_default_plans();
        let options = CheckoutOptions::new("price_nonexistent");

        let err = backend.purchase("user_1", &options).await.unwrap_err();
        assert!(err.to_string().contains("price_nonexistent"));

        // No partial state was written.
        let info = backend.customer_info("user_1").await.unwrap();
        assert!(info.entitlements().is_empty());
    }

    #[tokio::test]
    async fn test_forced_decline_yields_failure_result() {
        let backend = MockBackend::with_default_plans();
        backend.fail_next_purchase("card_declined");

        let options = CheckoutOptions::new("price_plus_monthly");
        let result = backend.purchase("user_1", &options).await.unwrap();
        assert!(!result.is_success());
        assert_eq!(result.error(), Some("card_declined"));
        assert_eq!(result.transaction_id(), None);

        // The decline is one-shot.
        let result = backend.purchase("user_1", &options).await.unwrap();
        assert!(result.is_success());
    }

    #[tokio::test]
    async fn test_second_purchase_replaces_wholesale() {
        let backend = MockBackend::with_default_plans();

        backend
            .purchase("user_1", &CheckoutOptions::new("price_plus_monthly"))
            .await
            .unwrap();
        let first = backend.customer_info("user_1").await.unwrap();
        let original = first.original_purchase_date();
        assert!(original.is_some());

        backend
            .purchase("user_1", &CheckoutOptions::new("price_plus_annual"))
            .await
            .unwrap();
        let second = backend.customer_info("user_1").await.unwrap();

        // Both entitlements present, the active set derived across them,
        // and the original purchase date preserved from the first sync.
        assert_eq!(second.entitlements().len(), 2);
        assert_eq!(
            second.active_subscriptions(),
            std::collections::BTreeSet::from(["plus_annual", "plus_monthly"])
        );
        assert_eq!(second.original_purchase_date(), original);

        // Latest expiration tracks the annual entitlement.
        assert_eq!(
            second.latest_expiration_date(),
            second.entitlement("plus_annual").unwrap().expiration_date
        );
    }

    #[tokio::test]
    async fn test_repurchase_same_plan_replaces_entitlement() {
        let backend = MockBackend::with_default_plans();
        let options = CheckoutOptions::new("price_plus_monthly");

        backend.purchase("user_1", &options).await.unwrap();
        backend.purchase("user_1", &options).await.unwrap();

        let info = backend.customer_info("user_1").await.unwrap();
        assert_eq!(info.entitlements().len(), 1);
    }

    #[tokio::test]
    async fn test_restore_returns_current_state() {
        let backend = MockBackend::with_default_plans();
        backend
            .purchase("user_1", &CheckoutOptions::new("price_plus_monthly"))
            .await
            .unwrap();

        let restored = backend.restore("user_1").await.unwrap();
        assert!(restored.is_entitled("plus_monthly"));
    }

    #[tokio::test]
    async fn test_seed_rejects_stale_entitlement() {
        let backend = MockBackend::with_default_plans();
        let past = Utc::now() - Duration::days(10);

        let stale = Entitlement {
            id: "plus_monthly".to_string(),
            is_active: true,
            will_renew: false,
            period_type: PeriodType::Normal,
            purchase_date: Some(past - Duration::days(30)),
            expiration_date: Some(past),
            store: Store::AppStore,
            product_id: "price_plus_monthly".to_string(),
            is_sandbox: true,
        };
        let info = CustomerInfo::from_parts("user_1", [stale], [], Some(past), None);

        let err = backend.seed_customer(info).unwrap_err();
        assert!(err.to_string().contains("already expired"));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let backend = MockBackend::with_default_plans();
        let clone = backend.clone();

        backend
            .purchase("user_1", &CheckoutOptions::new("price_plus_monthly"))
            .await
            .unwrap();

        let info = clone.customer_info("user_1").await.unwrap();
        assert!(info.is_entitled("plus_monthly"));
    }
}
