use std::sync::Mutex;

use subtrack_core::{
    backend, BackendKind, BillingBackend, CheckoutOptions, ConfigBuilder, FeatureFlag,
    FeatureFlags, RuntimeEnv, SubtrackError,
};
use subtrack_core::backend::MockBackend;

// Environment variables are process-global; serialize the tests that touch them.
static ENV_LOCK: Mutex<()> = Mutex::new(());

fn with_backend_var<R>(value: Option<&str>, f: impl FnOnce() -> R) -> R {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        match value {
            Some(v) => std::env::set_var("SUBTRACK_DATA_BACKEND", v),
            None => std::env::remove_var("SUBTRACK_DATA_BACKEND"),
        }
    }
    let result = f();
    unsafe {
        std::env::remove_var("SUBTRACK_DATA_BACKEND");
    }
    result
}

#[test]
fn test_unset_backend_var_resolves_to_mock() {
    with_backend_var(None, || {
        assert_eq!(BackendKind::from_env(), BackendKind::Mock);
    });
}

#[test]
fn test_garbage_backend_values_resolve_to_mock() {
    for garbage in ["", "postgres", "fire base", "mok", "FIREBASE!", "null", "  "] {
        with_backend_var(Some(garbage), || {
            assert_eq!(
                BackendKind::from_env(),
                BackendKind::Mock,
                "'{}' should fall back to mock",
                garbage
            );
        });
    }
}

#[test]
fn test_recognized_backend_values() {
    with_backend_var(Some("mock"), || {
        assert_eq!(BackendKind::from_env(), BackendKind::Mock);
    });
    with_backend_var(Some("firebase"), || {
        assert_eq!(BackendKind::from_env(), BackendKind::Firebase);
    });
    with_backend_var(Some("FIREBASE"), || {
        assert_eq!(BackendKind::from_env(), BackendKind::Firebase);
    });
}

#[test]
fn test_shipped_flag_table_is_all_disabled() {
    let flags = FeatureFlags::default();
    for flag in [
        FeatureFlag::FirebaseAuth,
        FeatureFlag::FirebaseStorage,
        FeatureFlag::PlaidIntegration,
        FeatureFlag::StripeBilling,
        FeatureFlag::PushNotifications,
    ] {
        assert!(!flags.is_enabled(flag), "{} must ship disabled", flag);
    }
}

#[test]
fn test_runtime_env_from_config_build() {
    let _guard = ENV_LOCK.lock().unwrap();
    unsafe {
        std::env::set_var("SUBTRACK_ENV", "production");
    }
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert!(config.env.is_production());
    assert!(!config.env.is_development());

    unsafe {
        std::env::set_var("SUBTRACK_ENV", "staging");
    }
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert!(config.env.is_development());
    assert!(!config.env.is_production());

    unsafe {
        std::env::remove_var("SUBTRACK_ENV");
    }
    let config = ConfigBuilder::new().from_env().build().unwrap();
    assert_eq!(config.env, RuntimeEnv::Development);
}

#[test]
fn test_firebase_selection_is_gated() {
    let config = ConfigBuilder::new()
        .with_backend(BackendKind::Firebase)
        .build()
        .unwrap();

    let err = backend::select(&config, subtrack_core::Plans::new()).unwrap_err();
    assert!(matches!(
        err,
        SubtrackError::FeatureDisabled {
            flag: FeatureFlag::FirebaseAuth
        }
    ));
}

#[tokio::test]
async fn test_mock_backend_end_to_end() {
    let config = ConfigBuilder::new().build().unwrap();
    let backend = backend::select(&config, subtrack_core::backend::mock::default_plans()).unwrap();

    assert_eq!(backend.kind(), BackendKind::Mock);

    let plans = backend.plans().await.unwrap();
    assert!(plans.iter().any(|p| p.id == "plus_monthly"));

    let result = backend
        .purchase("user_42", &CheckoutOptions::new("price_plus_monthly"))
        .await
        .unwrap();
    assert!(result.is_success());
    assert!(result.error().is_none());

    let info = backend.customer_info("user_42").await.unwrap();
    assert!(info.is_entitled("plus_monthly"));
    assert_eq!(info.active_subscriptions().len(), 1);
}

#[tokio::test]
async fn test_mock_backend_sync_replaces_per_user_state() {
    let backend = MockBackend::with_default_plans();

    backend
        .purchase("user_a", &CheckoutOptions::new("price_plus_monthly"))
        .await
        .unwrap();
    backend
        .purchase("user_b", &CheckoutOptions::new("price_plus_annual"))
        .await
        .unwrap();

    // Each user's state is independent and wholly derived from their own syncs.
    let a = backend.customer_info("user_a").await.unwrap();
    let b = backend.customer_info("user_b").await.unwrap();
    assert!(a.is_entitled("plus_monthly"));
    assert!(!a.is_entitled("plus_annual"));
    assert!(b.is_entitled("plus_annual"));
    assert!(!b.is_entitled("plus_monthly"));
}
