//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - PostgreSQL persistence and directory
//! - `memory` - In-memory persistence and directory for tests and local runs
//! - `notifier` - Outbound message delivery (logging, recording)

pub mod memory;
pub mod notifier;
pub mod postgres;

pub use memory::{InMemoryDirectory, InMemoryFeedbackStore};
pub use notifier::{LoggingNotifier, RecordingNotifier, SentNotification};
