use serde::{Deserialize, Serialize};

use crate::backend::BackendKind;
use crate::flags::{FeatureFlag, FeatureFlags};
use crate::utils::get_env_with_prefix;

/// Main configuration for a Subtrack process.
///
/// Built once at startup and passed by reference to every consumer; there is
/// no global config state. All fields are fixed for the process lifetime.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub backend: BackendKind,
    pub env: RuntimeEnv,
    pub flags: FeatureFlags,
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            env: RuntimeEnv::default(),
            flags: FeatureFlags::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Runtime environment classification.
///
/// Development and production are mutually exclusive by construction: both
/// accessors read the same underlying mode, so no state can answer true (or
/// false) to both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeEnv {
    Development,
    Production,
}

impl Default for RuntimeEnv {
    fn default() -> Self {
        Self::Development
    }
}

impl RuntimeEnv {
    /// Resolve from the `SUBTRACK_ENV` environment variable.
    ///
    /// `"production"` (case-insensitive) selects production; anything else,
    /// including an unset variable, selects development.
    #[must_use]
    pub fn from_env() -> Self {
        match get_env_with_prefix("ENV") {
            Some(value) if value.eq_ignore_ascii_case("production") => Self::Production,
            _ => Self::Development,
        }
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }

    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_json")]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: default_json(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_json() -> bool {
    false
}

/// Builder for Config with environment variable support
#[must_use = "builder does nothing until you call build()"]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_backend(mut self, backend: BackendKind) -> Self {
        self.config.backend = backend;
        self
    }

    pub fn with_env(mut self, env: RuntimeEnv) -> Self {
        self.config.env = env;
        self
    }

    pub fn with_flags(mut self, flags: FeatureFlags) -> Self {
        self.config.flags = flags;
        self
    }

    /// Enable a single feature flag.
    pub fn enable_flag(mut self, flag: FeatureFlag) -> Self {
        self.config.flags = self.config.flags.enable(flag);
        self
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.config.logging.level = level.into();
        self
    }

    pub fn with_json_logging(mut self, enabled: bool) -> Self {
        self.config.logging.json = enabled;
        self
    }

    /// Load configuration from environment variables with SUBTRACK_ prefix
    ///
    /// Environment variables:
    /// - `SUBTRACK_DATA_BACKEND`: Data backend selection, `mock` or `firebase`
    ///   (default: `mock`; unrecognized values fall back to `mock`)
    /// - `SUBTRACK_ENV`: `production` or `development` (default: `development`)
    /// - `SUBTRACK_LOG_LEVEL`: Log level (default: `info`)
    /// - `SUBTRACK_LOG_JSON`: JSON formatted logs (default: `false`)
    pub fn from_env(mut self) -> Self {
        self.config.backend = BackendKind::from_env();
        self.config.env = RuntimeEnv::from_env();

        if let Some(level) = get_env_with_prefix("LOG_LEVEL") {
            self.config.logging.level = level;
        }
        if let Some(json) = get_env_with_prefix("LOG_JSON") {
            self.config.logging.json = json.parse().unwrap_or(false);
        }

        self
    }

    /// Build the configuration, validating all settings
    ///
    /// # Errors
    ///
    /// Returns an error if the log level is not one of the known level names.
    /// Note that backend selection never fails here: unrecognized values have
    /// already fallen back to the mock backend during resolution.
    pub fn build(self) -> crate::error::Result<Config> {
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&self.config.logging.level.to_lowercase().as_str()) {
            return Err(crate::error::SubtrackError::configuration(format!(
                "Invalid log level: {}. Must be one of: {}",
                self.config.logging.level,
                valid_log_levels.join(", ")
            )));
        }

        Ok(self.config)
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
