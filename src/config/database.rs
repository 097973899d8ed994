//! PostgreSQL connection settings for the worker.
//!
//! The worker runs one periodic check at a time, so the pool stays small.
//! Only the URL is required.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

const SCHEMES: [&str; 2] = ["postgres://", "postgresql://"];

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL, `postgres://` or `postgresql://`
    pub url: String,

    /// Upper bound on pooled connections
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,

    /// Seconds to wait for a free connection before a check fails
    #[serde(default = "default_connect_wait")]
    pub connect_wait_secs: u64,

    /// Apply `migrations/` before the first check
    #[serde(default)]
    pub run_migrations: bool,
}

impl DatabaseConfig {
    /// Config pointing at `url` with the default pool settings.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            pool_size: default_pool_size(),
            connect_wait_secs: default_connect_wait(),
            run_migrations: false,
        }
    }

    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.pool_size)
            .acquire_timeout(Duration::from_secs(self.connect_wait_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.trim().is_empty() {
            return Err(ValidationError::MissingRequired("database.url"));
        }
        if !SCHEMES.iter().any(|scheme| self.url.starts_with(scheme)) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool_size == 0 {
            return Err(ValidationError::NotPositive("pool_size"));
        }
        if self.connect_wait_secs == 0 {
            return Err(ValidationError::NotPositive("connect_wait_secs"));
        }
        Ok(())
    }
}

fn default_pool_size() -> u32 {
    4
}

fn default_connect_wait() -> u64 {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    const URL: &str = "postgresql://feedback@localhost/feedback_cycles";

    #[test]
    fn defaults_keep_a_small_pool() {
        let config = DatabaseConfig::for_url(URL);
        assert_eq!(config.pool_size, 4);
        assert_eq!(config.connect_wait_secs, 10);
        assert!(!config.run_migrations);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn blank_url_is_missing() {
        assert_eq!(
            DatabaseConfig::for_url("  ").validate(),
            Err(ValidationError::MissingRequired("database.url"))
        );
    }

    #[test]
    fn non_postgres_url_is_rejected() {
        assert_eq!(
            DatabaseConfig::for_url("mysql://localhost/feedback").validate(),
            Err(ValidationError::InvalidDatabaseUrl)
        );
    }

    #[test]
    fn short_scheme_is_accepted() {
        assert!(DatabaseConfig::for_url("postgres://localhost/feedback")
            .validate()
            .is_ok());
    }

    #[test]
    fn empty_pool_is_rejected() {
        let config = DatabaseConfig {
            pool_size: 0,
            ..DatabaseConfig::for_url(URL)
        };
        assert_eq!(config.validate(), Err(ValidationError::NotPositive("pool_size")));
    }

    #[test]
    fn zero_connect_wait_is_rejected() {
        let config = DatabaseConfig {
            connect_wait_secs: 0,
            ..DatabaseConfig::for_url(URL)
        };
        assert_eq!(
            config.validate(),
            Err(ValidationError::NotPositive("connect_wait_secs"))
        );
    }
}
