//! Contribution handlers: drafts, submission and history.

mod access;

// Command handlers
mod submit_feedback;

// Query handlers
mod get_feedback_form;
mod get_feedback_history;

pub use get_feedback_form::{GetFeedbackFormHandler, GetFeedbackFormQuery, GetFeedbackFormResult};
pub use get_feedback_history::{
    GetFeedbackHistoryHandler, GetFeedbackHistoryQuery, GetFeedbackHistoryResult,
};
pub use submit_feedback::{SubmitFeedbackCommand, SubmitFeedbackHandler, SubmitFeedbackResult};
