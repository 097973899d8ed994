//! Notification configuration

use serde::Deserialize;
use std::time::Duration;

use crate::domain::foundation::Username;

use super::error::ValidationError;

/// Notification configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct NotificationConfig {
    /// Deliveries are only attempted when enabled
    #[serde(default)]
    pub enabled: bool,

    /// Seconds between scheduled checks; 0 disables the periodic job
    #[serde(default)]
    pub check_interval_secs: u64,

    /// Company name prefixed to every subject line
    #[serde(default)]
    pub company_name: String,

    /// Address shown to recipients for questions
    #[serde(default)]
    pub support_email: Option<String>,

    /// Base URL of the web application, linked from messages
    #[serde(default)]
    pub app_host: Option<String>,

    /// Talent managers receiving send confirmations (comma-separated)
    #[serde(default)]
    pub talent_manager_usernames: String,
}

impl NotificationConfig {
    /// Interval of the periodic check, if enabled.
    pub fn check_interval(&self) -> Option<Duration> {
        (self.check_interval_secs > 0).then(|| Duration::from_secs(self.check_interval_secs))
    }

    /// Parsed talent manager usernames.
    pub fn talent_managers(&self) -> Result<Vec<Username>, ValidationError> {
        self.talent_manager_usernames
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| Username::new(s).map_err(|_| ValidationError::InvalidTalentManager(s.to_string())))
            .collect()
    }

    /// Validate notification configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.talent_managers()?;
        if let Some(email) = &self.support_email {
            if !email.contains('@') {
                return Err(ValidationError::InvalidSupportEmail);
            }
        }
        Ok(())
    }
}
