//! Summary handlers: the pooled payload and the manager's submission.

// Command handlers
mod submit_summary;

// Query handlers
mod get_summary;

pub use get_summary::{GetSummaryHandler, GetSummaryQuery, GetSummaryResult};
pub use submit_summary::{SubmitSummaryCommand, SubmitSummaryHandler, SubmitSummaryResult};
