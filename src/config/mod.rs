//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `TERMINATION_POLICY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use termination_policy::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Turn floor: {}", config.policy.turn_floor);
//! ```

mod error;
mod features;
mod logging;
mod policy;

pub use error::{ConfigError, ValidationError};
pub use features::FeatureFlags;
pub use logging::LoggingConfig;
pub use policy::PolicySettings;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a usable config.
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Termination policy thresholds and pattern overrides
    #[serde(default)]
    pub policy: PolicySettings,

    /// Feature flags
    #[serde(default)]
    pub features: FeatureFlags,

    /// Log output configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `TERMINATION_POLICY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `TERMINATION_POLICY__POLICY__TURN_FLOOR=12` -> `policy.turn_floor = 12`
    /// - `TERMINATION_POLICY__FEATURES__LENIENT_STATE_RECOVERY=true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("TERMINATION_POLICY")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.policy.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}
