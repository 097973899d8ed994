//! Errors raised while loading or checking configuration.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read configuration: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// A setting that loaded but cannot be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingRequired(&'static str),

    #[error("database.url must use the postgres:// or postgresql:// scheme")]
    InvalidDatabaseUrl,

    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),

    #[error("homebase location '{0}' is not a known location")]
    UnknownHomebase(String),

    #[error("display format '{0}' is not usable")]
    InvalidDisplayFormat(String),

    #[error("talent manager '{0}' is not a valid username")]
    InvalidTalentManager(String),

    #[error("support e-mail must contain '@'")]
    InvalidSupportEmail,

    #[error("log filter '{0}' does not parse")]
    InvalidLogLevel(String),
}
