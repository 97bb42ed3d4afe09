//! Feature flag registry.
//!
//! A closed set of named capability switches, consulted before invoking any
//! integration that may not be wired to a live implementation yet. Every flag
//! ships disabled; a disabled flag means "do not attempt this code path",
//! not "attempt with degraded behavior".
//!
//! Flags are set only while building the [`Config`](crate::config::Config)
//! and are read-only for the rest of the process lifetime.
//!
//! # Example
//!
//! ```rust
//! use subtrack_core::flags::{FeatureFlag, FeatureFlags};
//!
//! let flags = FeatureFlags::default();
//! assert!(!flags.is_enabled(FeatureFlag::StripeBilling));
//!
//! let flags = FeatureFlags::default().enable(FeatureFlag::PushNotifications);
//! assert!(flags.is_enabled(FeatureFlag::PushNotifications));
//! ```

use serde::{Deserialize, Serialize};

/// A gated capability.
///
/// The set is closed: adding a flag is a compile-time change, and every
/// consultation site matches exhaustively, so a new variant cannot be
/// silently ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FeatureFlag {
    /// Firebase authentication.
    FirebaseAuth,
    /// Firebase cloud storage.
    FirebaseStorage,
    /// Plaid bank account linking.
    PlaidIntegration,
    /// Stripe billing integration.
    StripeBilling,
    /// Push notification delivery.
    PushNotifications,
}

impl FeatureFlag {
    /// All flags, in declaration order.
    pub const ALL: [Self; 5] = [
        Self::FirebaseAuth,
        Self::FirebaseStorage,
        Self::PlaidIntegration,
        Self::StripeBilling,
        Self::PushNotifications,
    ];

    /// The canonical flag name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::FirebaseAuth => "FIREBASE_AUTH",
            Self::FirebaseStorage => "FIREBASE_STORAGE",
            Self::PlaidIntegration => "PLAID_INTEGRATION",
            Self::StripeBilling => "STRIPE_BILLING",
            Self::PushNotifications => "PUSH_NOTIFICATIONS",
        }
    }
}

impl std::fmt::Display for FeatureFlag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The flag table.
///
/// Lookup is a pure function over a fixed set of booleans. The registry has
/// no failure mode: an unknown flag cannot be asked for, since [`FeatureFlag`]
/// is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FeatureFlags {
    firebase_auth: bool,
    firebase_storage: bool,
    plaid_integration: bool,
    stripe_billing: bool,
    push_notifications: bool,
}

impl FeatureFlags {
    /// The shipped default: every flag disabled.
    #[must_use]
    pub const fn disabled() -> Self {
        Self {
            firebase_auth: false,
            firebase_storage: false,
            plaid_integration: false,
            stripe_billing: false,
            push_notifications: false,
        }
    }

    /// Check whether a capability is enabled.
    #[must_use]
    pub fn is_enabled(&self, flag: FeatureFlag) -> bool {
        match flag {
            FeatureFlag::FirebaseAuth => self.firebase_auth,
            FeatureFlag::FirebaseStorage => self.firebase_storage,
            FeatureFlag::PlaidIntegration => self.plaid_integration,
            FeatureFlag::StripeBilling => self.stripe_billing,
            FeatureFlag::PushNotifications => self.push_notifications,
        }
    }

    /// Enable a flag. Only meaningful at config-build time.
    #[must_use]
    pub fn enable(mut self, flag: FeatureFlag) -> Self {
        match flag {
            FeatureFlag::FirebaseAuth => self.firebase_auth = true,
            FeatureFlag::FirebaseStorage => self.firebase_storage = true,
            FeatureFlag::PlaidIntegration => self.plaid_integration = true,
            FeatureFlag::StripeBilling => self.stripe_billing = true,
            FeatureFlag::PushNotifications => self.push_notifications = true,
        }
        self
    }

    /// All flags that are currently enabled.
    #[must_use]
    pub fn enabled(&self) -> Vec<FeatureFlag> {
        FeatureFlag::ALL
            .into_iter()
            .filter(|f| self.is_enabled(*f))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_flags_default_disabled() {
        let flags = FeatureFlags::default();
        for flag in FeatureFlag::ALL {
            assert!(!flags.is_enabled(flag), "{} should ship disabled", flag);
        }
        assert!(flags.enabled().is_empty());
    }

    #[test]
    fn test_enable_single_flag() {
        let flags = FeatureFlags::default().enable(FeatureFlag::StripeBilling);
        assert!(flags.is_enabled(FeatureFlag::StripeBilling));
        assert!(!flags.is_enabled(FeatureFlag::FirebaseAuth));
        assert!(!flags.is_enabled(FeatureFlag::FirebaseStorage));
        assert!(!flags.is_enabled(FeatureFlag::PlaidIntegration));
        assert!(!flags.is_enabled(FeatureFlag::PushNotifications));
        assert_eq!(flags.enabled(), vec![FeatureFlag::StripeBilling]);
    }

    #[test]
    fn test_flag_names() {
        assert_eq!(FeatureFlag::FirebaseAuth.as_str(), "FIREBASE_AUTH");
        assert_eq!(FeatureFlag::FirebaseStorage.as_str(), "FIREBASE_STORAGE");
        assert_eq!(FeatureFlag::PlaidIntegration.as_str(), "PLAID_INTEGRATION");
        assert_eq!(FeatureFlag::StripeBilling.as_str(), "STRIPE_BILLING");
        assert_eq!(FeatureFlag::PushNotifications.as_str(), "PUSH_NOTIFICATIONS");
    }

    #[test]
    fn test_serde_round_trip() {
        let flag: FeatureFlag = serde_json::from_str("\"PLAID_INTEGRATION\"").unwrap();
        assert_eq!(flag, FeatureFlag::PlaidIntegration);
        assert_eq!(
            serde_json::to_string(&FeatureFlag::FirebaseAuth).unwrap(),
            "\"FIREBASE_AUTH\""
        );
    }
}
