//! Notifier that writes each delivery to the log instead of sending mail.
//!
//! Stands in for the mail transport in development and in deployments where
//! delivery is handled by a log shipper.

use async_trait::async_trait;
use tracing::info;

use crate::domain::foundation::DomainError;
use crate::domain::profile::Profile;
use crate::ports::{Notification, Notifier};

/// Logs every notification at `info` with its recipients.
#[derive(Debug, Clone, Default)]
pub struct LoggingNotifier;

impl LoggingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Notifier for LoggingNotifier {
    async fn send(&self, notification: &Notification, recipients: &[Profile]) -> Result<bool, DomainError> {
        let addresses: Vec<&str> = recipients.iter().filter_map(|p| p.email.as_deref()).collect();
        info!(
            template = %notification.template,
            subject = %notification.subject,
            recipients = addresses.len(),
            to = ?addresses,
            "Notification delivered"
        );
        Ok(!addresses.is_empty())
    }
}
