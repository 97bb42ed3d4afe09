use crate::backend::BackendKind;
use crate::flags::FeatureFlag;

/// The main error type for subtrack-core consumers.
#[derive(Debug, thiserror::Error)]
pub enum SubtrackError {
    #[error("Feature '{flag}' is disabled")]
    FeatureDisabled { flag: FeatureFlag },

    #[error("Backend '{kind}' is not available: {reason}")]
    BackendUnavailable { kind: BackendKind, reason: String },

    #[error("Invalid configuration: {0}")]
    Configuration(String),

    #[error(transparent)]
    Billing(#[from] crate::billing::BillingError),

    #[error(transparent)]
    Validation(#[from] crate::validation::ValidationError),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl SubtrackError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    pub fn feature_disabled(flag: FeatureFlag) -> Self {
        Self::FeatureDisabled { flag }
    }

    pub fn backend_unavailable(kind: BackendKind, reason: impl Into<String>) -> Self {
        Self::BackendUnavailable {
            kind,
            reason: reason.into(),
        }
    }
}

/// Convenience Result type using SubtrackError.
pub type Result<T> = std::result::Result<T, SubtrackError>;
