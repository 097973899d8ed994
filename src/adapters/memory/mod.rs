//! In-memory adapters for tests and local runs.

mod directory;
mod feedback_store;

pub use directory::InMemoryDirectory;
pub use feedback_store::InMemoryFeedbackStore;
