//! Application configuration module
//!
//! Configuration is loaded from environment variables using the `config` and
//! `dotenvy` crates. Variables carry the `FEEDBACK_CYCLES` prefix and nested
//! values are separated by double underscores.
//!
//! # Example
//!
//! ```no_run
//! use feedback_cycles::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Homebase: {}", config.cycle.homebase_location);
//! ```

mod cycle;
mod database;
mod error;
mod notification;

pub use cycle::CycleConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use notification::NotificationConfig;

use serde::Deserialize;
use tracing_subscriber::EnvFilter;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Cycle timing, locations and display
    #[serde(default)]
    pub cycle: CycleConfig,

    /// Broadcast delivery and the periodic check
    #[serde(default)]
    pub notification: NotificationConfig,

    /// Log filter directive, used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[serde(default)]
    pub json_logs: bool,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `FEEDBACK_CYCLES` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `FEEDBACK_CYCLES__DATABASE__URL=...` -> `database.url = ...`
    /// - `FEEDBACK_CYCLES__CYCLE__HOMEBASE_LOCATION=Boston` -> `cycle.homebase_location`
    /// - `FEEDBACK_CYCLES__NOTIFICATION__ENABLED=true` -> `notification.enabled`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("FEEDBACK_CYCLES")
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
        self.database.validate()?;
        self.cycle.validate()?;
        self.notification.validate()?;
        self.log_filter()?;
        Ok(())
    }

    /// Log filter: `RUST_LOG` when set, else the configured level.
    pub fn log_filter(&self) -> Result<EnvFilter, ValidationError> {
        EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&self.log_level))
            .map_err(|_| ValidationError::InvalidLogLevel(self.log_level.clone()))
    }
}

fn default_log_level() -> String {
    "info,sqlx=warn".to_string()
}
