//! InviteReviewerHandler - Command handler for inviting an outside reviewer.
//!
//! The invite is committed first. The invitee is then told by message; a
//! failed delivery is logged and does not undo the invite.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::handlers::cycle::PhaseService;
use crate::application::handlers::notification::NotificationSettings;
use crate::domain::cycle::Phase;
use crate::domain::enrollment::{ExternalInvite, InviteOutcome};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{CycleId, ErrorCode, Timestamp, Username};
use crate::domain::notification::subject_line;
use crate::domain::profile::Profile;
use crate::ports::{Directory, EnrollmentRepository, Notification, Notifier};

/// Command to invite a reviewer by e-mail address.
#[derive(Debug, Clone)]
pub struct InviteReviewerCommand {
    /// The enrolled employee asking for feedback.
    pub inviter: Username,
    pub invitee_email: String,
    /// Cycle to invite for; the current cycle when absent.
    pub cycle_id: Option<CycleId>,
    pub now: Timestamp,
}

/// Result of an invite.
#[derive(Debug, Clone)]
pub struct InviteReviewerResult {
    pub invitee: Profile,
    pub outcome: InviteOutcome,
    /// Whether a message to the invitee was attempted.
    pub notified: bool,
}

/// Handler for external reviewer invites.
pub struct InviteReviewerHandler {
    phases: Arc<PhaseService>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    notifier: Arc<dyn Notifier>,
    settings: NotificationSettings,
}

impl InviteReviewerHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        directory: Arc<dyn Directory>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        notifier: Arc<dyn Notifier>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            phases,
            directory,
            enrollment_repository,
            notifier,
            settings,
        }
    }

    pub async fn handle(&self, cmd: InviteReviewerCommand) -> Result<InviteReviewerResult, FeedbackError> {
        // 1. Resolve the inviter and the phase in their zone
        let inviter = self
            .directory
            .resolve_user(&cmd.inviter)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(ErrorCode::UserNotFound, format!("User not found: {}", cmd.inviter))
            })?;
        let current = self
            .phases
            .resolve(cmd.cycle_id.as_ref(), inviter.location(), cmd.now)
            .await?;
        self.phases
            .require("invite a reviewer", &current, inviter.location(), Phase::Entry, Phase::Entry)?;

        // 2. Only enrolled employees may ask for outside feedback
        let cycle_id = current.cycle.id();
        if !self.enrollment_repository.is_enrolled(&cycle_id, &cmd.inviter).await? {
            return Err(FeedbackError::validation(
                "inviter",
                format!("{} is not enrolled in cycle {}", cmd.inviter, current.cycle.name()),
            ));
        }

        // 3. The invitee must be known to the directory
        let invitee = self
            .directory
            .resolve_by_email(&cmd.invitee_email)
            .await?
            .ok_or_else(|| {
                FeedbackError::not_found(
                    ErrorCode::UserNotFound,
                    format!("No user with e-mail {}", cmd.invitee_email.trim()),
                )
            })?;

        // 4. Persist; re-inviting the same person is a no-op
        let invite = ExternalInvite::new(cycle_id, cmd.inviter, invitee.username.clone(), cmd.now)?;
        let outcome = self.enrollment_repository.invite(&invite).await?;
        if outcome == InviteOutcome::AlreadyInvited {
            info!(cycle = %current.cycle.name(), inviter = %invite.inviter, invitee = %invite.invitee, "Reviewer already invited");
            return Ok(InviteReviewerResult {
                invitee,
                outcome,
                notified: false,
            });
        }
        info!(cycle = %current.cycle.name(), inviter = %invite.inviter, invitee = %invite.invitee, "Reviewer invited");

        // 5. Tell the invitee, outside the write
        let notified = if self.settings.enabled {
            let notification = Notification {
                template: "invite".to_string(),
                subject: subject_line(&self.settings.company_name, "Invitation to Provide Feedback"),
                context: json!({
                    "companyName": self.settings.company_name,
                    "cycleName": current.cycle.name(),
                    "inviterDisplayName": inviter.display_name,
                    "inviteeDisplayName": invitee.display_name,
                    "entryEnd": self.phases.render(current.cycle.boundaries().approval_start(), invitee.location()),
                    "appHost": self.settings.app_host,
                    "supportEmail": self.settings.support_email,
                }),
            };
            match self.notifier.send(&notification, std::slice::from_ref(&invitee)).await {
                Ok(attempted) => attempted,
                Err(e) => {
                    warn!(invitee = %invitee.username, error = %e, "Failed to send invite notification");
                    false
                }
            }
        } else {
            false
        };

        Ok(InviteReviewerResult {
            invitee,
            outcome,
            notified,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notifier::RecordingNotifier;
    use crate::application::handlers::test_support::{at, user, Fixture};

    fn handler_with(fixture: &Fixture, notifier: RecordingNotifier) -> InviteReviewerHandler {
        InviteReviewerHandler::new(
            fixture.phase_service(),
            Arc::new(fixture.directory.clone()),
            Arc::new(fixture.store.clone()),
            Arc::new(notifier),
            fixture.notification_settings(),
        )
    }

    fn command(inviter: &str, email: &str, now: Timestamp) -> InviteReviewerCommand {
        InviteReviewerCommand {
            inviter: user(inviter),
            invitee_email: email.to_string(),
            cycle_id: None,
            now,
        }
    }

    #[tokio::test]
    async fn invites_and_notifies_the_invitee() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, fixture.notifier.clone());

        let result = handler
            .handle(command("alice", "DAVE@partner.example", at::entry()))
            .await
            .unwrap();

        assert_eq!(result.outcome, InviteOutcome::Created);
        assert!(result.notified);
        assert!(fixture
            .store
            .is_invited(&fixture.cycle.id(), &user("alice"), &user("dave"))
            .await
            .unwrap());

        let sent = fixture.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].recipients, vec![user("dave")]);
        assert_eq!(sent[0].notification.subject, "Acme Feedback: Invitation to Provide Feedback");
        assert_eq!(sent[0].notification.context["inviterDisplayName"], "Alice Archer");
    }

    #[tokio::test]
    async fn reinviting_is_a_quiet_no_op() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, fixture.notifier.clone());
        handler.handle(command("alice", "dave@partner.example", at::entry())).await.unwrap();

        let again = handler
            .handle(command("alice", "dave@partner.example", at::entry()))
            .await
            .unwrap();

        assert_eq!(again.outcome, InviteOutcome::AlreadyInvited);
        assert!(!again.notified);
        assert_eq!(fixture.notifier.sent().len(), 1);
    }

    #[tokio::test]
    async fn failed_delivery_keeps_the_invite() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, RecordingNotifier::failing());

        let result = handler
            .handle(command("alice", "dave@partner.example", at::entry()))
            .await
            .unwrap();

        assert!(!result.notified);
        assert!(fixture
            .store
            .is_invited(&fixture.cycle.id(), &user("alice"), &user("dave"))
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn inviter_must_be_enrolled() {
        let fixture = Fixture::new().await;
        let handler = handler_with(&fixture, fixture.notifier.clone());

        let err = handler
            .handle(command("alice", "dave@partner.example", at::entry()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::ValidationFailed { ref field, .. } if field == "inviter"));
    }

    #[tokio::test]
    async fn unknown_email_is_not_found() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, fixture.notifier.clone());

        let err = handler
            .handle(command("alice", "nobody@example.com", at::entry()))
            .await
            .unwrap_err();
        assert_eq!(err.code(), ErrorCode::UserNotFound);
    }

    #[tokio::test]
    async fn self_invite_is_rejected() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, fixture.notifier.clone());

        let err = handler
            .handle(command("alice", "alice@example.com", at::entry()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::ValidationFailed { ref field, .. } if field == "invitee"));
    }

    #[tokio::test]
    async fn inviting_outside_entry_is_a_phase_mismatch() {
        let fixture = Fixture::new().await;
        fixture.enroll("alice").await;
        let handler = handler_with(&fixture, fixture.notifier.clone());

        let err = handler
            .handle(command("alice", "dave@partner.example", at::approval()))
            .await
            .unwrap_err();
        assert!(matches!(err, FeedbackError::PhaseMismatch { expected: Phase::Entry, actual: Phase::Approval, .. }));
    }
}
