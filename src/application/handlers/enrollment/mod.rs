//! Enrollment command handlers.

mod enroll;
mod invite_reviewer;

pub use enroll::{EnrollCommand, EnrollHandler, EnrollResult};
pub use invite_reviewer::{InviteReviewerCommand, InviteReviewerHandler, InviteReviewerResult};
