//! CheckAndSendHandler - Command handler for phase broadcasts.
//!
//! Picks the broadcast for the cycle's phase (or the one asked for), resolves
//! its audience, claims it in the ledger and only then hands it to the
//! notifier. The claim is a single compare-and-set, so a scheduled run racing
//! a forced one sends at most once. Delivery happens after the claim and is
//! never retried here.

use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};

use crate::application::handlers::cycle::PhaseService;
use crate::domain::cycle::{Cycle, Phase};
use crate::domain::errors::FeedbackError;
use crate::domain::foundation::{CycleId, Timestamp};
use crate::domain::notification::{subject_line, Audience, ClaimOutcome, MessageCode};
use crate::domain::profile::Profile;
use crate::ports::{BroadcastLedger, Directory, EnrollmentRepository, FormRepository, Notification, Notifier};

use super::NotificationSettings;

/// Command to check and send the broadcast for a cycle.
#[derive(Debug, Clone)]
pub struct CheckAndSendCommand {
    /// The current cycle when absent.
    pub cycle_id: Option<CycleId>,
    /// The phase-start broadcast when absent. Reminders need `force`.
    pub code: Option<MessageCode>,
    /// Send even if the code was already sent.
    pub force: bool,
    pub now: Timestamp,
}

/// Why nothing was sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Deliveries are switched off.
    Disabled,
    /// The phase has no broadcast.
    NothingForPhase(Phase),
    /// Already sent and not forced.
    AlreadySent { code: MessageCode, at: Timestamp },
}

/// What a check did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckAndSendOutcome {
    Sent {
        cycle_name: String,
        code: MessageCode,
        /// Recipients with an e-mail address.
        recipients: usize,
        /// Whether the notifier reported an attempt.
        attempted: bool,
    },
    Skipped(SkipReason),
}

/// Handler for phase broadcasts.
pub struct CheckAndSendHandler {
    phases: Arc<PhaseService>,
    ledger: Arc<dyn BroadcastLedger>,
    directory: Arc<dyn Directory>,
    enrollment_repository: Arc<dyn EnrollmentRepository>,
    form_repository: Arc<dyn FormRepository>,
    notifier: Arc<dyn Notifier>,
    settings: NotificationSettings,
}

impl CheckAndSendHandler {
    pub fn new(
        phases: Arc<PhaseService>,
        ledger: Arc<dyn BroadcastLedger>,
        directory: Arc<dyn Directory>,
        enrollment_repository: Arc<dyn EnrollmentRepository>,
        form_repository: Arc<dyn FormRepository>,
        notifier: Arc<dyn Notifier>,
        settings: NotificationSettings,
    ) -> Self {
        Self {
            phases,
            ledger,
            directory,
            enrollment_repository,
            form_repository,
            notifier,
            settings,
        }
    }

    pub async fn handle(&self, cmd: CheckAndSendCommand) -> Result<CheckAndSendOutcome, FeedbackError> {
        // 1. Reminders are never picked implicitly
        if let Some(code) = cmd.code {
            if code.is_reminder() && !cmd.force {
                return Err(FeedbackError::validation(
                    "code",
                    format!("Reminder {} can only be sent with force", code),
                ));
            }
        }

        if !self.settings.enabled {
            info!("Notifications disabled, skipping broadcast check");
            return Ok(CheckAndSendOutcome::Skipped(SkipReason::Disabled));
        }

        // 2. Cycle, phase (homebase) and code
        let current = self.phases.resolve(cmd.cycle_id.as_ref(), None, cmd.now).await?;
        let code = match cmd.code.or_else(|| MessageCode::for_phase(current.phase)) {
            Some(code) => code,
            None => {
                info!(cycle = %current.cycle.name(), phase = %current.phase, "No broadcast for phase");
                return Ok(CheckAndSendOutcome::Skipped(SkipReason::NothingForPhase(current.phase)));
            }
        };

        // 3. Resolve the audience; a failed read leaves the code unclaimed
        let audience = self.audience(code.audience(), &current.cycle).await?;
        let recipients: Vec<Profile> = audience
            .into_iter()
            .filter(|p| {
                let has_email = p.email.as_deref().is_some_and(|e| !e.trim().is_empty());
                if !has_email {
                    warn!(username = %p.username, code = %code, "Recipient has no e-mail, skipped");
                }
                has_email
            })
            .collect();

        let notification = Notification {
            template: code.template().to_string(),
            subject: code.subject(&self.settings.company_name),
            context: self.context(code, &current.cycle),
        };

        // 4. Claim, then deliver
        match self
            .ledger
            .claim(&current.cycle.id(), code, cmd.now, cmd.force)
            .await?
        {
            ClaimOutcome::AlreadySent { at } => {
                info!(cycle = %current.cycle.name(), code = %code, "Broadcast already sent");
                return Ok(CheckAndSendOutcome::Skipped(SkipReason::AlreadySent { code, at }));
            }
            ClaimOutcome::Claimed { previous } => {
                if let Some(previous) = previous {
                    info!(cycle = %current.cycle.name(), code = %code, previous = %previous.as_datetime(), "Resending broadcast");
                }
            }
        }

        let attempted = self.deliver(&notification, &recipients).await;
        info!(
            cycle = %current.cycle.name(),
            code = %code,
            recipients = recipients.len(),
            attempted,
            "Broadcast sent"
        );

        // 5. Tell the talent managers; the broadcast stands either way
        if attempted {
            if let Err(e) = self
                .confirm(&notification, code, &current.cycle, recipients.len())
                .await
            {
                warn!(cycle = %current.cycle.name(), code = %code, error = %e, "Confirmation not sent");
            }
        }

        Ok(CheckAndSendOutcome::Sent {
            cycle_name: current.cycle.name().to_string(),
            code,
            recipients: recipients.len(),
            attempted,
        })
    }

    async fn audience(&self, audience: Audience, cycle: &Cycle) -> Result<Vec<Profile>, FeedbackError> {
        let profiles = match audience {
            Audience::Employee => self.directory.list_staff().await?,
            Audience::NonEnrolled => {
                let enrolled = self.enrollment_repository.list_enrolled(&cycle.id()).await?;
                self.directory
                    .list_staff()
                    .await?
                    .into_iter()
                    .filter(|p| !enrolled.contains(&p.username))
                    .collect()
            }
            Audience::Manager => self.directory.list_managers().await?,
            Audience::Summarised => {
                let mut profiles = Vec::new();
                for username in self.form_repository.list_summary_recipients(&cycle.id()).await? {
                    match self.directory.resolve_user(&username).await? {
                        Some(profile) => profiles.push(profile),
                        None => warn!(username = %username, "Summary recipient missing from directory"),
                    }
                }
                profiles
            }
        };
        Ok(profiles)
    }

    fn context(&self, code: MessageCode, cycle: &Cycle) -> serde_json::Value {
        let b = cycle.boundaries();
        let render = |at| self.phases.render(at, None);
        json!({
            "code": code.code(),
            "cycleName": cycle.name(),
            "companyName": self.settings.company_name,
            "supportEmail": self.settings.support_email,
            "appHost": self.settings.app_host,
            "enrolStart": render(b.enroll_start()),
            "entryStart": render(b.entry_start()),
            "approvalStart": render(b.approval_start()),
            "approvalEnd": render(b.approval_end()),
        })
    }

    async fn deliver(&self, notification: &Notification, recipients: &[Profile]) -> bool {
        match self.notifier.send(notification, recipients).await {
            Ok(attempted) => attempted,
            Err(e) => {
                warn!(template = %notification.template, error = %e, "Notification delivery failed");
                false
            }
        }
    }

    async fn confirm(
        &self,
        sent: &Notification,
        code: MessageCode,
        cycle: &Cycle,
        recipient_count: usize,
    ) -> Result<(), FeedbackError> {
        let mut managers = Vec::with_capacity(self.settings.talent_managers.len());
        for username in &self.settings.talent_managers {
            match self.directory.resolve_user(username).await? {
                Some(profile) => managers.push(profile),
                None => warn!(username = %username, "Talent manager missing from directory"),
            }
        }
        if managers.is_empty() {
            return Ok(());
        }

        let confirmation = Notification {
            template: "confirmation".to_string(),
            subject: subject_line(&self.settings.company_name, "Emails sent"),
            context: json!({
                "code": code.code(),
                "cycleName": cycle.name(),
                "originalSubject": sent.subject,
                "recipientCount": recipient_count,
            }),
        };
        self.deliver(&confirmation, &managers).await;
        Ok(())
    }
}
