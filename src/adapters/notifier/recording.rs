//! Recording notifier for tests.
//!
//! Keeps every notification it is handed, and can be told to fail so callers
//! can check that a delivery failure never undoes committed state.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, ErrorCode, Username};
use crate::domain::profile::Profile;
use crate::ports::{Notification, Notifier};

/// One captured delivery.
#[derive(Debug, Clone, PartialEq)]
pub struct SentNotification {
    pub notification: Notification,
    pub recipients: Vec<Username>,
}

/// Notifier that records deliveries in memory.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<SentNotification>>>,
    failing: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier whose every `send` fails.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Deliveries captured so far, oldest first.
    pub fn sent(&self) -> Vec<SentNotification> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, notification: &Notification, recipients: &[Profile]) -> Result<bool, DomainError> {
        if self.failing {
            return Err(DomainError::new(
                ErrorCode::NotifierError,
                "Mail transport unavailable",
            ));
        }
        let mut sent = self.sent.lock().map_err(|_| {
            DomainError::new(ErrorCode::InternalError, "Recording notifier lock poisoned")
        })?;
        sent.push(SentNotification {
            notification: notification.clone(),
            recipients: recipients.iter().map(|p| p.username.clone()).collect(),
        });
        Ok(true)
    }
}
