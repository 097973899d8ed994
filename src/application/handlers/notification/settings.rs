//! Settings shared by the handlers that send messages.

use crate::config::{NotificationConfig, ValidationError};
use crate::domain::foundation::Username;

/// Message settings resolved from configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationSettings {
    /// Deliveries are only attempted when true.
    pub enabled: bool,
    pub company_name: String,
    pub support_email: Option<String>,
    pub app_host: Option<String>,
    /// Receive a confirmation after every broadcast.
    pub talent_managers: Vec<Username>,
}

impl NotificationSettings {
    pub fn from_config(config: &NotificationConfig) -> Result<Self, ValidationError> {
        Ok(Self {
            enabled: config.enabled,
            company_name: config.company_name.clone(),
            support_email: config.support_email.clone(),
            app_host: config.app_host.clone(),
            talent_managers: config.talent_managers()?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_carry_parsed_talent_managers() {
        let config = NotificationConfig {
            enabled: true,
            company_name: "Acme".to_string(),
            talent_manager_usernames: "tm1, tm2".to_string(),
            ..Default::default()
        };

        let settings = NotificationSettings::from_config(&config).unwrap();
        assert!(settings.enabled);
        assert_eq!(settings.company_name, "Acme");
        assert_eq!(settings.talent_managers.len(), 2);
    }
}
