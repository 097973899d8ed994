//! Directory profile of an employee or external reviewer.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::Username;

/// What the directory knows about a person.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub username: Username,
    pub display_name: String,
    pub location: Option<String>,
    pub manager_username: Option<Username>,
    pub business_unit: Option<String>,
    pub email: Option<String>,
    /// Staff are eligible for enrollment and receive broadcasts.
    pub is_staff: bool,
}

impl Profile {
    /// A staff profile with only the required fields set.
    pub fn staff(username: Username, display_name: impl Into<String>) -> Self {
        Self {
            username,
            display_name: display_name.into(),
            location: None,
            manager_username: None,
            business_unit: None,
            email: None,
            is_staff: true,
        }
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_manager(mut self, manager: Username) -> Self {
        self.manager_username = Some(manager);
        self
    }

    pub fn with_business_unit(mut self, unit: impl Into<String>) -> Self {
        self.business_unit = Some(unit.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Whether this person sits outside `business_unit`.
    ///
    /// With no configured unit everyone is internal.
    pub fn is_external_to(&self, business_unit: Option<&str>) -> bool {
        match business_unit {
            Some(unit) => self.business_unit.as_deref() != Some(unit),
            None => false,
        }
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }
}
