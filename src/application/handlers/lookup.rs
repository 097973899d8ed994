//! Lookups shared by the feedback and summary handlers.

use crate::domain::cycle::{Cycle, QuestionTemplate};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{ErrorCode, Username};
use crate::domain::profile::Profile;
use crate::ports::{Directory, EnrollmentRepository, TemplateRepository};

/// Resolves `username`, failing with not-found when the directory has no entry.
pub(crate) async fn require_profile(
    directory: &dyn Directory,
    username: &Username,
) -> Result<Profile, FeedbackError> {
    directory.resolve_user(username).await?.ok_or_else(|| {
        FeedbackError::not_found(ErrorCode::UserNotFound, format!("User not found: {}", username))
    })
}

/// Loads the question template of `cycle`.
pub(crate) async fn require_template(
    templates: &dyn TemplateRepository,
    cycle: &Cycle,
) -> Result<QuestionTemplate, FeedbackError> {
    templates
        .find_by_id(&cycle.template_id())
        .await?
        .ok_or_else(|| {
            FeedbackError::not_found(
                ErrorCode::TemplateNotFound,
                format!("Template {} of cycle {} not found", cycle.template_id(), cycle.name()),
            )
        })
}

/// Fails unless `recipient` enrolled in `cycle`.
pub(crate) async fn require_enrolled(
    enrollments: &dyn EnrollmentRepository,
    cycle: &Cycle,
    recipient: &Username,
) -> Result<(), FeedbackError> {
    if enrollments.is_enrolled(&cycle.id(), recipient).await? {
        Ok(())
    } else {
        Err(FeedbackError::validation(
            "to",
            format!("{} did not request feedback in cycle {}", recipient, cycle.name()),
        ))
    }
}
