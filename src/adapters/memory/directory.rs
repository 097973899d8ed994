//! In-memory directory of profiles.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, Username};
use crate::domain::profile::Profile;
use crate::ports::Directory;

/// Directory backed by a map of profiles keyed by username.
#[derive(Clone, Default)]
pub struct InMemoryDirectory {
    profiles: Arc<RwLock<HashMap<Username, Profile>>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a directory seeded with `profiles`.
    pub fn with_profiles(profiles: impl IntoIterator<Item = Profile>) -> Self {
        let map = profiles
            .into_iter()
            .map(|p| (p.username.clone(), p))
            .collect();
        Self {
            profiles: Arc::new(RwLock::new(map)),
        }
    }

    /// Adds or replaces a profile.
    pub async fn insert(&self, profile: Profile) {
        self.profiles
            .write()
            .await
            .insert(profile.username.clone(), profile);
    }
}

#[async_trait]
impl Directory for InMemoryDirectory {
    async fn resolve_user(&self, username: &Username) -> Result<Option<Profile>, DomainError> {
        Ok(self.profiles.read().await.get(username).cloned())
    }

    async fn resolve_by_email(&self, email: &str) -> Result<Option<Profile>, DomainError> {
        let wanted = email.trim();
        let profiles = self.profiles.read().await;
        Ok(profiles
            .values()
            .find(|p| {
                p.email
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(wanted))
            })
            .cloned())
    }

    async fn list_staff(&self) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.profiles.read().await;
        let mut staff: Vec<Profile> = profiles.values().filter(|p| p.is_staff).cloned().collect();
        staff.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(staff)
    }

    async fn list_managers(&self) -> Result<Vec<Profile>, DomainError> {
        let profiles = self.profiles.read().await;
        let mut managers: Vec<Profile> = profiles
            .values()
            .filter(|p| {
                p.is_staff
                    && profiles
                        .values()
                        .any(|r| r.manager_username.as_ref() == Some(&p.username))
            })
            .cloned()
            .collect();
        managers.sort_by(|a, b| a.username.cmp(&b.username));
        Ok(managers)
    }
}
