//! Notification module - cycle broadcasts and their send ledger.

mod ledger;
mod message_code;

pub use ledger::{BroadcastLog, ClaimOutcome, NotificationState};
pub use message_code::{subject_line, Audience, MessageCode};
