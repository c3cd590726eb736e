//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PREVIEW_RELAY` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use preview_relay::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Viewer page at {}", config.viewer_url());
//! ```

mod error;
mod preview;
mod relay;

pub use error::{ConfigError, ValidationError};
pub use preview::{PreviewConfig, DEFAULT_STYLE};
pub use relay::{RelayConfig, DEFAULT_PORT};

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Relay server configuration (host, port, logging)
    #[serde(default)]
    pub relay: RelayConfig,

    /// Producer side configuration (style, idle timer, browser)
    #[serde(default)]
    pub preview: PreviewConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PREVIEW_RELAY` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PREVIEW_RELAY__RELAY__PORT=7379` -> `relay.port = 7379`
    /// - `PREVIEW_RELAY__PREVIEW__STYLE=...` -> `preview.style = ...`
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
                    .prefix("PREVIEW_RELAY")
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
        self.relay.validate()?;
        self.preview.validate()?;
        Ok(())
    }

    /// URL of the viewer page served by the relay.
    pub fn viewer_url(&self) -> String {
        match &self.preview.viewer_url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}/", self.relay.host, self.relay.port),
        }
    }
}
