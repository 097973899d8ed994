//! Cycle configuration

use serde::Deserialize;

use crate::domain::cycle::{
    CycleSelection, DisplayPolicy, LocationZones, DEFAULT_DISPLAY_FORMAT, DEFAULT_HOMEBASE,
    DEFAULT_LOOKAHEAD_DAYS, DEFAULT_REVIEW_GRACE_DAYS,
};

use super::error::ValidationError;

/// Cycle configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CycleConfig {
    /// Location whose timezone applies to unknown or missing locations
    #[serde(default = "default_homebase")]
    pub homebase_location: String,

    /// Business unit of regular staff; profiles outside it are external reviewers
    #[serde(default)]
    pub business_unit: Option<String>,

    /// Cycles enrolling within this many days are candidates for "current"
    #[serde(default = "default_lookahead_days")]
    pub lookahead_days: i64,

    /// Days after its enrollment start that a cycle stays current while the next is pending
    #[serde(default = "default_review_grace_days")]
    pub review_grace_days: i64,

    /// strftime format for boundaries shown to users
    #[serde(default = "default_display_format")]
    pub display_format: String,

    /// Number of past cycles shown in feedback history
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl CycleConfig {
    /// Location table with the configured homebase.
    pub fn zones(&self) -> Result<LocationZones, ValidationError> {
        LocationZones::new(self.homebase_location.clone())
            .map_err(|_| ValidationError::UnknownHomebase(self.homebase_location.clone()))
    }

    /// Current-cycle selection windows.
    pub fn selection(&self) -> CycleSelection {
        CycleSelection {
            lookahead_days: self.lookahead_days,
            review_grace_days: self.review_grace_days,
        }
    }

    pub fn display_policy(&self) -> Result<DisplayPolicy, ValidationError> {
        DisplayPolicy::new(self.display_format.clone())
            .map_err(|_| ValidationError::InvalidDisplayFormat(self.display_format.clone()))
    }

    /// Validate cycle configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.zones()?;
        self.display_policy()?;
        if self.lookahead_days <= 0 {
            return Err(ValidationError::NotPositive("lookahead_days"));
        }
        if self.review_grace_days < 0 {
            return Err(ValidationError::NotPositive("review_grace_days"));
        }
        if self.history_limit == 0 {
            return Err(ValidationError::NotPositive("history_limit"));
        }
        Ok(())
    }
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            homebase_location: default_homebase(),
            business_unit: None,
            lookahead_days: default_lookahead_days(),
            review_grace_days: default_review_grace_days(),
            display_format: default_display_format(),
            history_limit: default_history_limit(),
        }
    }
}

fn default_homebase() -> String {
    DEFAULT_HOMEBASE.to_string()
}

fn default_lookahead_days() -> i64 {
    DEFAULT_LOOKAHEAD_DAYS
}

fn default_review_grace_days() -> i64 {
    DEFAULT_REVIEW_GRACE_DAYS
}

fn default_display_format() -> String {
    DEFAULT_DISPLAY_FORMAT.to_string()
}

fn default_history_limit() -> usize {
    3
}
