//! Who may write a contribution for whom.

use crate::application::handlers::lookup::{require_enrolled, require_profile};
use crate::domain::cycle::Cycle;
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::Username;
use crate::domain::profile::Profile;
use crate::ports::{Directory, EnrollmentRepository};

/// Checks that `contributor` may write feedback for `recipient` in `cycle`
/// and returns the recipient's profile.
///
/// Nobody reviews themselves, the recipient must have enrolled, and a
/// contributor outside `business_unit` needs the recipient's invite.
pub(super) async fn check_contribution_access(
    directory: &dyn Directory,
    enrollments: &dyn EnrollmentRepository,
    business_unit: Option<&str>,
    cycle: &Cycle,
    contributor: &Profile,
    recipient: &Username,
) -> Result<Profile, FeedbackError> {
    if &contributor.username == recipient {
        return Err(FeedbackError::validation("to", "You cannot give feedback to yourself"));
    }

    let recipient_profile = require_profile(directory, recipient).await?;
    require_enrolled(enrollments, cycle, recipient).await?;

    if contributor.is_external_to(business_unit)
        && !enrollments
            .is_invited(&cycle.id(), recipient, &contributor.username)
            .await?
    {
        return Err(FeedbackError::validation(
            "to",
            format!(
                "{} has not invited {} to give feedback in cycle {}",
                recipient,
                contributor.username,
                cycle.name()
            ),
        ));
    }

    Ok(recipient_profile)
}
