//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Declares a UUID-backed identifier with the usual constructors and
/// conversions.
macro_rules! uuid_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            #[doc = concat!("Creates a new random ", stringify!($name), ".")]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            #[doc = concat!("Creates a ", stringify!($name), " from an existing UUID.")]
            pub fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

uuid_id! {
    /// Unique identifier for a feedback cycle.
    CycleId
}

uuid_id! {
    /// Unique identifier for a question template.
    TemplateId
}

uuid_id! {
    /// Unique identifier for a single question inside a template.
    QuestionId
}

uuid_id! {
    /// Unique identifier for a feedback form (contribution or summary).
    FormId
}

uuid_id! {
    /// Unique identifier for one stored answer.
    AnswerId
}

/// Maximum stored length of a username.
pub const USERNAME_MAX_LEN: usize = 32;

/// Directory login name of an employee.
///
/// Usernames are the join key between the directory and every
/// cycle-scoped record (enrollments, invites, forms).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Username(String);

impl Username {
    /// Creates a new Username, rejecting blank or oversized values.
    pub fn new(name: impl Into<String>) -> Result<Self, ValidationError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::empty_field("username"));
        }
        if trimmed.chars().count() > USERNAME_MAX_LEN {
            return Err(ValidationError::invalid_format(
                "username",
                format!("longer than {} characters", USERNAME_MAX_LEN),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the inner string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Username {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_id_generates_unique_values() {
        let id1 = CycleId::new();
        let id2 = CycleId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn form_id_from_uuid_preserves_value() {
        let uuid = Uuid::new_v4();
        let id = FormId::from_uuid(uuid);
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn question_id_parses_from_string() {
        let uuid = Uuid::new_v4();
        let id: QuestionId = uuid.to_string().parse().unwrap();
        assert_eq!(id.as_uuid(), &uuid);
    }

    #[test]
    fn template_id_rejects_garbage() {
        assert!("not-a-uuid".parse::<TemplateId>().is_err());
    }

    #[test]
    fn answer_id_serializes_as_plain_uuid() {
        let uuid = Uuid::new_v4();
        let json = serde_json::to_string(&AnswerId::from_uuid(uuid)).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }

    #[test]
    fn username_accepts_plain_name() {
        let name = Username::new("jdoe").unwrap();
        assert_eq!(name.as_str(), "jdoe");
    }

    #[test]
    fn username_trims_surrounding_whitespace() {
        let name = Username::new("  jdoe ").unwrap();
        assert_eq!(name.as_str(), "jdoe");
    }

    #[test]
    fn username_rejects_empty_string() {
        match Username::new("   ") {
            Err(ValidationError::EmptyField { field }) => assert_eq!(field, "username"),
            other => panic!("Expected EmptyField error, got {:?}", other),
        }
    }

    #[test]
    fn username_rejects_overlong_value() {
        let long = "x".repeat(USERNAME_MAX_LEN + 1);
        assert!(Username::new(long).is_err());
    }

    #[test]
    fn username_displays_correctly() {
        let name = Username::new("asmith").unwrap();
        assert_eq!(format!("{}", name), "asmith");
    }
}
