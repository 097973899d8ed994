//! EnrollHandler - Command handler for opting into a cycle.

use std::sync::Arc;

use tracing::info;

use crate::application::handlers::cycle::PhaseService;
use crate::domain::cycle::Phase;
use crate::domain::enrollment::Enrollment;
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{CycleId, ErrorCode, Timestamp, Username};
use crate::ports::{Directory, EnrollmentRepository};

/// Command to enroll a user in a cycle.
#[derive(Debug, Clone)]
pub struct EnrollCommand {
    pub username: Username,
    /// Cycle to enroll in; the current cycle when absent.
    pub cycle_id: Option<CycleId>,
    pub now: Timestamp,
}

/// Result of a successful enrollment.
#[derive(Debug, Clone)]
pub struct EnrollResult {
    pub enrollment: Enrollment,
    pub cycle_name: String,
    /// When contributors can start writing, in the user's zone.
    pub entry_opens: String,
}

/// Handler for enrolling in cycles.
pub struct EnrollHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
}

impl EnrollHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
    ) -> Self {
        Self {
            phases,
            directory,
            enrollment_repository,
        }
    }

    pub async fn handle(&self, cmd: EnrollCommand) -> Result<EnrollResult, FeedbackError> {
        // 1. Resolve the user; only staff receive feedback
        let profile = self
            .directory
            .resolve_user(&cmd.username)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(ErrorCode::UserNotFound, format!("User not found: {}", cmd.username))
            })?;
        if !profile.is_staff {
            return Err(FeedbackError::validation(
                "username",
                format!("{} is not a member of staff and cannot enroll", cmd.username),
            ));
        }

        // 2. Enrollment is only open during the enrollment phase
        let current = self
            .phases
            .resolve(cmd.cycle_id.as_ref(), profile.location(), cmd.now)
            .await?;
        self.phases
            .require("enroll", &current, profile.location(), Phase::Enrollment, Phase::Enrollment)?;

        // 3. Persist; a second enrollment is a conflict
        let enrollment = Enrollment::new(current.cycle.id(), cmd.username, cmd.now);
        self.enrollment_repository.enroll(&enrollment).await?;

        info!(
            cycle = %current.cycle.name(),
            username = %enrollment.username,
            "User enrolled"
        );

        Ok(EnrollResult {
            entry_opens: self
                .phases
                .render(current.cycle.boundaries().entry_start(), profile.location()),
            cycle_name: current.cycle.name().to_string(),
            enrollment,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::{at, user, Fixture};

    fn handler(fixture: &Fixture) -> EnrollHandler {
        EnrollHandler::new(
            fixture.phase_service(),
            Arc::new(fixture.directory.clone()),
            Arc::new(fixture.store.clone()),
        )
    }

    fn command(name: &str, now: Timestamp) -> EnrollCommand {
        EnrollCommand {
            username: user(name),
            cycle_id: None,
            now,
        }
    }

    #[tokio::test]
    async fn enrolls_during_enrollment() {
        let fixture = Fixture::new().await;
        let result = handler(&fixture).handle(command("alice", at::enrollment())).await.unwrap();

        assert_eq!(result.cycle_name, "2024 Mar");
        assert_eq!(result.enrollment.cycle_id, fixture.cycle.id());
        assert!(!result.entry_opens.is_empty());
        assert!(fixture
            .store
            .is_enrolled(&fixture.cycle.id(), &user("alice"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn second_enrollment_is_a_conflict() {
        let fixture = Fixture::new().await;
        let handler = handler(&fixture);
        handler.handle(command("alice", at::enrollment())).await.unwrap();

        let err = handler.handle(command("alice", at::enrollment())).await.unwrap_err();
        assert!(matches!(err, FeedbackError::Conflict { code: ErrorCode::AlreadyEnrolled, .. }));
    }

    #[tokio::test]
    async fn enrolling_during_entry_is_a_phase_mismatch() {
        let fixture = Fixture::new().await;
        let err = handler(&fixture).handle(command("alice", at::entry())).await.unwrap_err();

        match err {
            FeedbackError::PhaseMismatch { expected, actual, boundary, .. } => {
                assert_eq!(expected, Phase::Enrollment);
                assert_eq!(actual, Phase::Entry);
                assert!(boundary.starts_with("closed "));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn enrolling_before_the_cycle_names_the_opening() {
        let fixture = Fixture::new().await;
        let mut cmd = command("alice", at::before());
        cmd.cycle_id = Some(fixture.cycle.id());

        let err = handler(&fixture).handle(cmd).await.unwrap_err();
        assert!(matches!(
            err,
            FeedbackError::PhaseMismatch { actual: Phase::Inactive, ref boundary, .. } if boundary.starts_with("opens ")
        ));
    }

    #[tokio::test]
    async fn non_staff_cannot_enroll() {
        let fixture = Fixture::new().await;
        let err = handler(&fixture).handle(command("dave", at::enrollment())).await.unwrap_err();
        assert!(matches!(err, FeedbackError::ValidationFailed { .. }));
    }

    #[tokio::test]
    async fn unknown_user_is_not_found() {
        let fixture = Fixture::new().await;
        let err = handler(&fixture).handle(command("zed", at::enrollment())).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }
}
