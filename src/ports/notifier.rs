//! Notifier port - outbound messages.
//!
//! Delivery happens outside any persistence transaction and is never retried
//! here. The result only says whether an attempt was made.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;

/// A message to render and deliver.
#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    /// Template name, e.g. "entry" or "invite".
    pub template: String,
    pub subject: String,
    /// Values the template may reference.
    pub context: Value,
}

/// Delivers notifications to recipients.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempt delivery to every recipient.
    ///
    /// Returns `Ok(true)` if at least one delivery was attempted.
    async fn send(&self, notification: &Notification, recipients: &[Profile]) -> Result<bool, DomainError>;
}
