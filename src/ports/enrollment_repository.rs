//! Enrollment and invite repository port.

use async_trait::async_trait;

use crate::domain::enrollment::{Enrollment, ExternalInvite, InviteOutcome};
use crate::domain::foundation::{CycleId, DomainError, Username};

/// Repository port for enrollments and external invites.
///
/// Enrollment is strict: a second enrollment for the same (cycle, user) is a
/// conflict. Invites are idempotent.
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    /// Record an enrollment.
    ///
    /// # Errors
    ///
    /// - `AlreadyEnrolled` if the user is already enrolled in the cycle
    /// - `DatabaseError` on persistence failure
    async fn enroll(&self, enrollment: &Enrollment) -> Result<(), DomainError>;

    async fn is_enrolled(&self, cycle_id: &CycleId, username: &Username) -> Result<bool, DomainError>;

    /// Everyone enrolled in a cycle.
    async fn list_enrolled(&self, cycle_id: &CycleId) -> Result<Vec<Username>, DomainError>;

    /// Record an invite, or report that it already exists.
    async fn invite(&self, invite: &ExternalInvite) -> Result<InviteOutcome, DomainError>;

    /// Whether `inviter` invited `invitee` for the cycle.
    async fn is_invited(
        &self,
        cycle_id: &CycleId,
        inviter: &Username,
        invitee: &Username,
    ) -> Result<bool, DomainError>;

    /// Everyone who invited `invitee` for the cycle.
    async fn list_inviters(&self, cycle_id: &CycleId, invitee: &Username) -> Result<Vec<Username>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrollment_repository_is_object_safe() {
        fn _accepts_dyn(_repo: &dyn EnrollmentRepository) {}
    }
}
