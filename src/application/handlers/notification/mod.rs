//! Notification handlers - phase broadcasts and shared message settings.

mod check_and_send;
mod settings;

pub use check_and_send::{CheckAndSendCommand, CheckAndSendHandler, CheckAndSendOutcome, SkipReason};
pub use settings::NotificationSettings;
