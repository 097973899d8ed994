//! Directory port - who people are.
//!
//! "Not found" is an ordinary answer (`Ok(None)`), never an error.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, Username};
use crate::domain::profile::Profile;

/// Lookup of employee and reviewer profiles.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn resolve_user(&self, username: &Username) -> Result<Option<Profile>, DomainError>;

    async fn resolve_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError>;

    /// Every staff member.
    async fn list_staff(&self) -> Result<Vec<Profile>, DomainError>;

    /// Staff who manage at least one person.
    async fn list_managers(&self) -> Result<Vec<Profile>, DomainError>;
}
