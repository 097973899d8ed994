//! Feedback module - forms, answers, submission rules and read models.
//!
//! Contributions are written by peers during entry. A single summary per
//! recipient is written by their manager during approval, seeded from the
//! pooled contributions, and becomes the recipient's record in review.

mod form;
mod history;
mod pooling;
mod submission;
mod view;

pub use form::{Answer, ExistingSummary, Form};
pub use history::{HistoryEntry, HistoryItem};
pub use pooling::PooledAnswers;
pub use submission::{
    check_answer_length, prepare_submission, validate_answer_set, AnswerInput, FormAddress,
    PreparedForm, ANSWER_CHAR_LIMIT,
};
pub use view::{FormItem, FormView};
